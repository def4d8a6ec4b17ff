use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use regtest_extract::ExtractionProfile;
use regtest_runner::RunContext;

/// Project configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Short method names (alias -> canonical method)
    #[serde(default)]
    pub aliases: HashMap<String, String>,

    /// Extraction profile per canonical method; others use the beam profile
    #[serde(default)]
    pub profiles: HashMap<String, ExtractionProfile>,
}

impl CliConfig {
    pub const DEFAULT_PATH: &'static str = "regtest.toml";

    /// Load config from the given path, or `./regtest.toml`.
    /// A missing default file yields the default config; a missing explicit
    /// path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(Self::DEFAULT_PATH);
                if !default.exists() {
                    debug!("No regtest.toml, using built-in profiles");
                    return Ok(Self::default());
                }
                default
            }
        };

        debug!(?config_path, "Loading config");
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to parse config: {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build the run context; fails on an invalid tolerance or profile.
    pub fn into_context(self, tolerance_percent: f64) -> Result<RunContext> {
        let context = RunContext {
            tolerance_percent,
            profiles: self.profiles,
            aliases: self.aliases,
        };
        context.validate()?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[aliases]
lq = "lineSquareTube"

[profiles.lineSquareTube]
container = ["OUTPUT"]
embed_tag = "Data"
leaves = []
sample_tag = "SLOPE"
sample_fields = [["Pos", "PosY"], ["Sensor"]]
numeric = ["Pos", "PosY", "Sensor"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = CliConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.aliases["lq"], "lineSquareTube");
        let tube = &config.profiles["lineSquareTube"];
        assert_eq!(tube.container, vec!["OUTPUT"]);
        assert!(tube.leaves.is_empty());
        assert_eq!(tube.sample_fields.len(), 2);
    }

    #[test]
    fn test_partial_profile_uses_defaults() {
        let config = CliConfig::parse("[profiles.frame]\ncontainer = [\"FRAME\"]\n").unwrap();
        let frame = &config.profiles["frame"];
        assert!(frame.embed_tag.is_none());
        assert!(frame.sample_tag.is_none());
        assert!(frame.numeric.is_empty());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = CliConfig::parse("").unwrap();
        assert!(config.aliases.is_empty());
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_into_context_validates() {
        let ctx = CliConfig::parse(SAMPLE).unwrap().into_context(2.5).unwrap();
        assert_eq!(ctx.resolve_method("lq"), "lineSquareTube");
        assert_eq!(ctx.tolerance_percent, 2.5);

        let broken = CliConfig::parse("[profiles.x]\ncontainer = []\n").unwrap();
        assert!(broken.into_context(5.0).is_err());
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(CliConfig::load(Some(&tmp.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = CliConfig::parse(SAMPLE).unwrap();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: CliConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.profiles, config.profiles);
    }
}
