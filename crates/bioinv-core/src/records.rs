//! Record types flowing through the pipeline stages.
//!
//! `PredictionRecord` is the immutable upstream input (one row per article).
//! Each stage attaches its output without recomputing earlier stages:
//! verification results, resolved names, and finally the deduplicated
//! `InventoryRecord`, which drops free-text fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a predicted resource name span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameType {
    /// Short form, e.g. "PDB".
    Common,
    /// Spelled-out form, e.g. "Protein Data Bank".
    Full,
}

/// One candidate name extracted by the upstream NER stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamePrediction {
    pub text: String,
    pub kind: NameType,
    /// Model probability in `[0, 1]`.
    pub probability: f64,
}

/// One row per article as produced by upstream extraction. Immutable input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Unique article identifier (PMID or similar).
    pub id: String,
    pub title: String,
    pub abstract_text: String,
    /// Extracted URLs in document order.
    pub urls: Vec<String>,
    /// Candidate name predictions in document order.
    pub names: Vec<NamePrediction>,
}

/// Terminal classification of a single URL liveness check.
///
/// Expected failures are values, not errors: an unreachable host after all
/// attempts becomes `NetworkError` with the last error message observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// HTTP response with status < 400 (redirects are recorded as-is).
    Success(u16),
    /// HTTP response with status >= 400. Not retried.
    ClientFailure(u16),
    /// The request never completed: DNS failure, connection refused,
    /// timeout, TLS error, or an unparsable URL.
    NetworkError(String),
}

impl CheckOutcome {
    /// True when the live check got a sub-400 response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, CheckOutcome::Success(_))
    }
}

impl fmt::Display for CheckOutcome {
    /// Renders the numeric status for HTTP outcomes and the error message
    /// for network failures, matching the status column format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Success(status) | CheckOutcome::ClientFailure(status) => {
                write!(f, "{status}")
            }
            CheckOutcome::NetworkError(message) => write!(f, "{message}"),
        }
    }
}

/// Best-effort geolocation of a responding host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Verification output for one URL. Computed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlVerificationResult {
    pub url: String,
    pub outcome: CheckOutcome,
    /// Present only when the outcome is `Success` and a provider answered.
    pub geo: Option<GeoLocation>,
    /// Closest archived snapshot, independent of live status.
    pub archived_url: Option<String>,
}

/// A prediction record with one verification result per URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedRecord {
    pub record: PredictionRecord,
    /// Parallel to `record.urls`. Empty when the record has no URLs.
    pub verifications: Vec<UrlVerificationResult>,
}

/// A name candidate selected as the best of its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredName {
    pub text: String,
    pub probability: f64,
}

/// Coarse trust classification of a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    /// Best name probability met the threshold; auto-accepted.
    High,
    /// Below threshold (or no name); needs manual review.
    Low,
}

impl ConfidenceTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministically resolved names for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNameResult {
    pub best_common: Option<ScoredName>,
    pub best_full: Option<ScoredName>,
    /// The higher-probability of `best_common`/`best_full`; full wins ties.
    pub best_name: Option<ScoredName>,
    pub confidence: ConfidenceTier,
}

/// A verified record with resolved names attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub record: PredictionRecord,
    pub verifications: Vec<UrlVerificationResult>,
    pub names: ResolvedNameResult,
}

/// Terminal output unit after deduplication.
///
/// Title/abstract are dropped: they stop being meaningful once several
/// articles are merged into one resource row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Source article IDs in first-seen order. Never empty. A list, not a
    /// set: duplicate IDs survive if upstream supplied them.
    pub ids: Vec<String>,
    /// The representative (first-seen group member) URL verification set.
    pub urls: Vec<UrlVerificationResult>,
    pub names: ResolvedNameResult,
    pub confidence: ConfidenceTier,
}

impl InventoryRecord {
    /// Wraps one resolved record as a singleton inventory row, ahead of
    /// grouping. Drops title/abstract.
    #[must_use]
    pub fn from_resolved(resolved: ResolvedRecord) -> Self {
        let confidence = resolved.names.confidence;
        InventoryRecord {
            ids: vec![resolved.record.id],
            urls: resolved.verifications,
            names: resolved.names,
            confidence,
        }
    }

    /// The record's primary URL, used as the `url` dedup key.
    #[must_use]
    pub fn primary_url(&self) -> Option<&str> {
        self.urls.first().map(|v| v.url.as_str())
    }
}
