//! Deterministic selection of the best resource name per record.

use bioinv_core::{ConfidenceTier, NamePrediction, NameType, ResolvedNameResult, ScoredName};

/// Resolves the candidate predictions of one record into best common, best
/// full, and overall best names.
///
/// Within each type the highest-probability candidate wins; an exact tie
/// keeps the first-seen candidate. The overall best is the
/// higher-probability of the two per-type winners, and an exact tie there
/// goes to the full name — the spelled-out form is the more useful
/// inventory label. Confidence is `High` iff the best name's probability
/// meets `min_prob` (boundary inclusive).
#[must_use]
pub fn resolve_names(names: &[NamePrediction], min_prob: f64) -> ResolvedNameResult {
    let best_common = best_of_type(names, NameType::Common);
    let best_full = best_of_type(names, NameType::Full);

    let best_name = match (&best_common, &best_full) {
        (Some(common), Some(full)) => {
            if full.probability >= common.probability {
                Some(full.clone())
            } else {
                Some(common.clone())
            }
        }
        (Some(common), None) => Some(common.clone()),
        (None, Some(full)) => Some(full.clone()),
        (None, None) => None,
    };

    let confidence = match &best_name {
        Some(name) if name.probability >= min_prob => ConfidenceTier::High,
        _ => ConfidenceTier::Low,
    };

    ResolvedNameResult {
        best_common,
        best_full,
        best_name,
        confidence,
    }
}

/// Highest-probability candidate of one type; first-seen wins exact ties.
fn best_of_type(names: &[NamePrediction], kind: NameType) -> Option<ScoredName> {
    let mut best: Option<&NamePrediction> = None;
    for candidate in names.iter().filter(|n| n.kind == kind) {
        match best {
            Some(current) if candidate.probability <= current.probability => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|n| ScoredName {
        text: n.text.clone(),
        probability: n.probability,
    })
}
