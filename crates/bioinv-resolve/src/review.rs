//! Confidence-based review flagging of aggregated records.

use bioinv_core::{ConfidenceTier, InventoryRecord};

/// Counts from one flagging pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub auto_accepted: usize,
    pub needs_review: usize,
}

/// Assigns the final confidence tier to each aggregated record.
///
/// Pure function of the best name's probability against `min_prob`
/// (boundary inclusive: exactly `min_prob` is auto-accepted). Records with
/// no best name are low-confidence by definition. Low-tier rows are the
/// ones queued for manual review.
pub fn flag_for_review(records: &mut [InventoryRecord], min_prob: f64) -> ReviewSummary {
    let mut summary = ReviewSummary::default();

    for record in records.iter_mut() {
        let tier = match &record.names.best_name {
            Some(name) if name.probability >= min_prob => ConfidenceTier::High,
            _ => ConfidenceTier::Low,
        };
        record.confidence = tier;
        record.names.confidence = tier;
        match tier {
            ConfidenceTier::High => summary.auto_accepted += 1,
            ConfidenceTier::Low => summary.needs_review += 1,
        }
    }

    tracing::info!(
        auto_accepted = summary.auto_accepted,
        needs_review = summary.needs_review,
        min_prob,
        "flagged records for review"
    );
    summary
}
