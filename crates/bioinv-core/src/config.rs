//! Pipeline configuration and validation.
//!
//! Every component receives its settings as explicit immutable values built
//! here; there is no ambient global state. Out-of-range values are
//! process-fatal at startup, before any network or file I/O.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown dedup key \"{0}\" (expected best_name, common_name, full_name, or url)")]
    UnknownDedupKey(String),

    #[error("dedup_keys must name at least one key")]
    EmptyDedupKeys,
}

/// Field used to decide that two records describe the same resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupKey {
    BestName,
    CommonName,
    FullName,
    Url,
}

impl DedupKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DedupKey::BestName => "best_name",
            DedupKey::CommonName => "common_name",
            DedupKey::FullName => "full_name",
            DedupKey::Url => "url",
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "best_name" => Ok(DedupKey::BestName),
            "common_name" => Ok(DedupKey::CommonName),
            "full_name" => Ok(DedupKey::FullName),
            "url" => Ok(DedupKey::Url),
            other => Err(ConfigError::UnknownDedupKey(other.to_owned())),
        }
    }
}

/// Parses a comma-separated dedup key list, e.g. `"best_name,url"`.
///
/// # Errors
///
/// Returns [`ConfigError::EmptyDedupKeys`] for an empty list and
/// [`ConfigError::UnknownDedupKey`] for an unrecognized name.
pub fn parse_dedup_keys(raw: &str) -> Result<Vec<DedupKey>, ConfigError> {
    let keys = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(DedupKey::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    if keys.is_empty() {
        return Err(ConfigError::EmptyDedupKeys);
    }
    Ok(keys)
}

/// Validated settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum URL count for a record to survive filtering.
    pub min_urls: usize,
    /// Maximum URL count for a record to survive filtering.
    pub max_urls: usize,
    /// Best-name probability threshold for the high confidence tier.
    pub min_prob: f64,
    /// Total liveness-check attempts per URL (first try included).
    pub num_tries: u32,
    /// Base backoff in seconds; the wait before attempt k is
    /// `backoff_factor * 2^(k-2)`. Zero disables waiting.
    pub backoff_factor: f64,
    /// Maximum simultaneously in-flight URL checks.
    pub concurrency_limit: usize,
    /// Grouping keys for deduplication.
    pub dedup_keys: Vec<DedupKey>,
}

impl PipelineConfig {
    /// Checks every field against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending
    /// field, or [`ConfigError::EmptyDedupKeys`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_urls > self.max_urls {
            return Err(ConfigError::InvalidValue {
                field: "min_urls",
                reason: format!(
                    "min_urls ({}) must not exceed max_urls ({})",
                    self.min_urls, self.max_urls
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.min_prob) {
            return Err(ConfigError::InvalidValue {
                field: "min_prob",
                reason: format!("must be within [0, 1], got {}", self.min_prob),
            });
        }
        if self.num_tries < 1 {
            return Err(ConfigError::InvalidValue {
                field: "num_tries",
                reason: "must be at least 1".to_owned(),
            });
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_factor",
                reason: format!("must be a finite value >= 0, got {}", self.backoff_factor),
            });
        }
        if self.concurrency_limit < 1 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency_limit",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.dedup_keys.is_empty() {
            return Err(ConfigError::EmptyDedupKeys);
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Defaults mirror the production run: up to two URLs per record, three
    /// tries with a half-second backoff base, and dedup on the best name.
    fn default() -> Self {
        PipelineConfig {
            min_urls: 1,
            max_urls: 2,
            min_prob: 0.9,
            num_tries: 3,
            backoff_factor: 0.5,
            concurrency_limit: default_concurrency(),
            dedup_keys: vec![DedupKey::BestName],
        }
    }
}

/// Available parallelism of the host, falling back to 1 when unknown.
#[must_use]
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}
