use serde::{Deserialize, Serialize};

use regtest_core::RegtestError;

/// Leaf tags of the beam `RESULT` block.
pub const BEAM_RESULT_TAGS: &[&str] = &[
    "START",
    "END",
    "WIDTH",
    "HEIGHT_MIN",
    "HEIGHT_MAX",
    "HEIGHT_MEAN",
    "ANGLE",
];

/// Describes where a method's metrics live in its XML output and which tags
/// are required.
///
/// Deserialised from the `[profiles.<method>]` tables of `regtest.toml`; omitted
/// fields are empty, not inherited from the beam profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionProfile {
    /// Container tag names, tried in order. First descendant match wins.
    pub container: Vec<String>,
    /// Element whose text holds an escaped inner document, searched when the
    /// outer document has no container.
    #[serde(default)]
    pub embed_tag: Option<String>,
    /// Required leaf children of the container. Empty collects every child.
    #[serde(default)]
    pub leaves: Vec<String>,
    /// Repeated record element (e.g. `SLOPE`) collected from the whole payload.
    #[serde(default)]
    pub sample_tag: Option<String>,
    /// Required fields of each sample; each entry lists accepted tag names.
    /// Empty collects every child of the sample.
    #[serde(default)]
    pub sample_fields: Vec<Vec<String>>,
    /// Tags whose value must be numeric.
    #[serde(default)]
    pub numeric: Vec<String>,
}

impl ExtractionProfile {
    /// Beam property output: `RESULT` (or `OUTPUT`) leaves plus `SLOPE` samples,
    /// optionally embedded in a `Data` element.
    pub fn beam() -> Self {
        Self {
            container: vec!["RESULT".into(), "OUTPUT".into()],
            embed_tag: Some("Data".into()),
            leaves: BEAM_RESULT_TAGS.iter().map(|t| t.to_string()).collect(),
            sample_tag: Some("SLOPE".into()),
            sample_fields: vec![
                vec!["Pos".into(), "PosY".into()],
                vec!["Sensor".into()],
            ],
            numeric: vec!["Pos".into(), "PosY".into(), "Sensor".into()],
        }
    }

    pub fn validate(&self) -> Result<(), RegtestError> {
        if self.container.iter().all(|t| t.trim().is_empty()) {
            return Err(RegtestError::Config(
                "extraction profile needs at least one container tag".into(),
            ));
        }
        if self.sample_fields.iter().any(Vec::is_empty) {
            return Err(RegtestError::Config(
                "sample field entries must name at least one tag".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn is_numeric(&self, tag: &str) -> bool {
        self.numeric.iter().any(|t| t == tag)
    }

    pub(crate) fn container_label(&self) -> String {
        self.container
            .iter()
            .map(|t| format!("<{t}>"))
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Default for ExtractionProfile {
    fn default() -> Self {
        Self::beam()
    }
}
