use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single extracted metric: a number, a string, or a list of nested records
/// (e.g. repeated slope samples).
///
/// Serialised untagged, so stored references read as plain JSON:
/// `{"WIDTH": 100.0, "SLOPE": [{"Pos": 1.0, "Sensor": 0.5}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    Samples(Vec<MetricSet>),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_samples(&self) -> Option<&[MetricSet]> {
        match self {
            MetricValue::Samples(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    /// Short type label used in mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            MetricValue::Number(_) => "number",
            MetricValue::Text(_) => "text",
            MetricValue::Samples(_) => "samples",
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) if s.is_empty() => f.write_str("\"\""),
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Samples(s) => write!(f, "[{} samples]", s.len()),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        MetricValue::Number(n)
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::Text(s.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        MetricValue::Text(s)
    }
}

impl From<Vec<MetricSet>> for MetricValue {
    fn from(samples: Vec<MetricSet>) -> Self {
        MetricValue::Samples(samples)
    }
}

/// Coerce raw element text into a metric value.
///
/// Whitespace is stripped, then integer and float parses are tried in that
/// order. Only finite floats count as numbers, so `"NaN"` and `"inf"` stay
/// text. Empty text is `Text("")`, never a number.
pub fn coerce(raw: &str) -> MetricValue {
    let text = raw.trim();
    if text.is_empty() {
        return MetricValue::Text(String::new());
    }
    if let Ok(i) = text.parse::<i64>() {
        return MetricValue::Number(i as f64);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => MetricValue::Number(f),
        _ => MetricValue::Text(text.to_string()),
    }
}

/// Rejected mutation of a [`MetricSet`].
#[derive(Debug, Error, PartialEq)]
pub enum MetricSetError {
    #[error("duplicate metric '{0}'")]
    Duplicate(String),
    #[error("'{key}' already holds a {kind} value")]
    NotSamples { key: String, kind: &'static str },
}

/// Ordered mapping from metric name to value. Keys are unique: [`MetricSet::insert`]
/// refuses to overwrite an existing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(IndexMap<String, MetricValue>);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new metric. Fails if the key is already taken.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetricValue>,
    ) -> Result<(), MetricSetError> {
        let key = key.into();
        if self.0.contains_key(&key) {
            return Err(MetricSetError::Duplicate(key));
        }
        self.0.insert(key, value.into());
        Ok(())
    }

    /// Append one record to the sample list stored under `key`, creating it on first use.
    pub fn push_sample(&mut self, key: &str, record: MetricSet) -> Result<(), MetricSetError> {
        match self.0.get_mut(key) {
            None => {
                self.0.insert(key.to_string(), MetricValue::Samples(vec![record]));
                Ok(())
            }
            Some(MetricValue::Samples(samples)) => {
                samples.push(record);
                Ok(())
            }
            Some(other) => Err(MetricSetError::NotSamples {
                key: key.to_string(),
                kind: other.kind(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Later pairs replace earlier ones with the same key.
impl<K: Into<String>, V: Into<MetricValue>> FromIterator<(K, V)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
