use std::collections::HashMap;

use regtest_core::RegtestError;
use regtest_extract::{ExtractionProfile, MetricExtractor};

/// Settings shared by every case of a run. Built once by the entry point and
/// handed to the [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone)]
pub struct RunContext {
    pub tolerance_percent: f64,
    /// Extraction profile per canonical method name.
    pub profiles: HashMap<String, ExtractionProfile>,
    /// Short method names, e.g. `lq` → `lineSquareTube`.
    pub aliases: HashMap<String, String>,
}

impl RunContext {
    pub fn new(tolerance_percent: f64) -> Self {
        Self {
            tolerance_percent,
            profiles: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn with_profile(mut self, method: impl Into<String>, profile: ExtractionProfile) -> Self {
        self.profiles.insert(method.into(), profile);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, method: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), method.into());
        self
    }

    /// Canonical method name. Aliases resolve one level deep.
    pub fn resolve_method<'a>(&'a self, method: &'a str) -> &'a str {
        self.aliases.get(method).map_or(method, String::as_str)
    }

    /// Extractor for a method (alias or canonical). Methods without a profile
    /// use the built-in beam profile.
    pub fn extractor_for(&self, method: &str) -> MetricExtractor {
        let method = self.resolve_method(method);
        let profile = self.profiles.get(method).cloned().unwrap_or_default();
        MetricExtractor::new(profile)
    }

    pub fn validate(&self) -> Result<(), RegtestError> {
        if !self.tolerance_percent.is_finite() || self.tolerance_percent < 0.0 {
            return Err(RegtestError::Config(format!(
                "tolerance must be a non-negative percentage, got {}",
                self.tolerance_percent
            )));
        }
        for (method, profile) in &self.profiles {
            profile.validate().map_err(|e| match e {
                RegtestError::Config(msg) => RegtestError::Config(format!("profile '{method}': {msg}")),
                other => other,
            })?;
        }
        for (alias, target) in &self.aliases {
            if alias.trim().is_empty() || target.trim().is_empty() {
                return Err(RegtestError::Config(format!(
                    "alias '{alias}' -> '{target}' has an empty side"
                )));
            }
        }
        Ok(())
    }
}
