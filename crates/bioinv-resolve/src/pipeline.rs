//! Resolution pipeline orchestration.

use bioinv_core::{InventoryRecord, PipelineConfig, ResolvedRecord, VerifiedRecord};

use crate::dedup::deduplicate;
use crate::filter::{filter_records, RemovalReport};
use crate::names::resolve_names;
use crate::review::{flag_for_review, ReviewSummary};

/// Output of one resolution run.
#[derive(Debug)]
pub struct ResolutionOutput {
    pub inventory: Vec<InventoryRecord>,
    pub removals: RemovalReport,
    pub review: ReviewSummary,
}

/// Runs the post-verification stages in order:
///
/// 1. Filter out records that cannot become inventory rows (reporting why).
/// 2. Resolve the best common/full/overall name per record.
/// 3. Collapse to singleton inventory rows (dropping title/abstract) and
///    merge duplicates under the configured keys.
/// 4. Flag low-confidence rows for manual review.
#[must_use]
pub fn resolve_inventory(
    records: Vec<VerifiedRecord>,
    config: &PipelineConfig,
) -> ResolutionOutput {
    let (kept, removals) = filter_records(records, config);

    let resolved: Vec<ResolvedRecord> = kept
        .into_iter()
        .map(|verified| {
            let names = resolve_names(&verified.record.names, config.min_prob);
            ResolvedRecord {
                record: verified.record,
                verifications: verified.verifications,
                names,
            }
        })
        .collect();

    let singletons: Vec<InventoryRecord> = resolved
        .into_iter()
        .map(InventoryRecord::from_resolved)
        .collect();

    let mut inventory = deduplicate(singletons, &config.dedup_keys);
    let review = flag_for_review(&mut inventory, config.min_prob);

    ResolutionOutput {
        inventory,
        removals,
        review,
    }
}
