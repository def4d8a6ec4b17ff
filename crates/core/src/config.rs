use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RegtestError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Key lookup used to build a [`Config`]; `from_env` reads the process environment.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Read a profiled key: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_opt(lookup: Lookup<'_>, profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed).filter(|s| !s.is_empty()) {
            return Some(v);
        }
    }
    lookup(key).filter(|s| !s.is_empty())
}

fn profiled_or(lookup: Lookup<'_>, profile: &str, key: &str, default: &str) -> String {
    profiled_opt(lookup, profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_parse<T: std::str::FromStr>(
    lookup: Lookup<'_>,
    profile: &str,
    key: &str,
    default: T,
) -> Result<T, RegtestError> {
    match profiled_opt(lookup, profile, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RegtestError::Config(format!("{key}: cannot parse '{raw}'"))),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub store: StoreConfig,
    /// Maximum allowed percent difference for numeric metrics.
    pub tolerance_percent: f64,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `REGTEST_PROFILE`. When set (e.g. `CI`), every key is
    /// first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, RegtestError> {
        let profile = process_env("REGTEST_PROFILE").unwrap_or_default();
        Self::from_lookup(&profile, &process_env)
    }

    /// Build config for a named profile from an arbitrary key source.
    pub fn from_lookup(
        profile: &str,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, RegtestError> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let config = Self {
            profile: p.to_string(),
            store: StoreConfig::from_lookup(lookup, p)?,
            tolerance_percent: profiled_parse(lookup, p, "REGTEST_TOLERANCE_PERCENT", 5.0)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RegtestError> {
        if !self.tolerance_percent.is_finite() || self.tolerance_percent < 0.0 {
            return Err(RegtestError::Config(format!(
                "tolerance must be a non-negative percentage, got {}",
                self.tolerance_percent
            )));
        }
        if self.store.connect_timeout.is_zero() {
            return Err(RegtestError::Config(
                "store connect timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  store:     data_dir={}, create={}", self.store.data_dir.display(), self.store.create_if_missing);
        tracing::info!("  timeout:   {:?}", self.store.connect_timeout);
        tracing::info!("  tolerance: {}%", self.tolerance_percent);
    }
}

// ── Reference store ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    /// Upper bound on establishing the store connection.
    pub connect_timeout: Duration,
    pub create_if_missing: bool,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            connect_timeout: Duration::from_millis(5000),
            create_if_missing: true,
        }
    }

    fn from_lookup(lookup: Lookup<'_>, p: &str) -> Result<Self, RegtestError> {
        Ok(Self {
            data_dir: PathBuf::from(profiled_or(lookup, p, "REGTEST_DATA_DIR", "data/references")),
            connect_timeout: Duration::from_millis(profiled_parse(
                lookup,
                p,
                "REGTEST_CONNECT_TIMEOUT_MS",
                5000u64,
            )?),
            create_if_missing: profiled_parse(lookup, p, "REGTEST_CREATE_STORE", true)?,
        })
    }
}
