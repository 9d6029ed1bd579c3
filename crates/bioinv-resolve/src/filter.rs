//! Structural filtering of verified records.

use bioinv_core::{PipelineConfig, VerifiedRecord};

/// Per-reason removal counts for one filter pass.
///
/// Predicates are evaluated independently: a record is removed once but
/// counted under every reason it matches, so the per-reason counts may sum
/// to more than `removed`. That double-counting is deliberate — the report
/// is a diagnostic, not a partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// URL count below the configured minimum.
    pub no_url: usize,
    /// URL count above the configured maximum.
    pub too_many_urls: usize,
    /// No name candidates of either type, so no name can be resolved.
    pub no_name: usize,
    /// Records removed (each counted once).
    pub removed: usize,
    /// Records surviving the pass.
    pub kept: usize,
}

/// Drops records that cannot become useful inventory rows and reports why.
///
/// A record survives only if its URL count is within
/// `[min_urls, max_urls]` and it has at least one name candidate.
#[must_use]
pub fn filter_records(
    records: Vec<VerifiedRecord>,
    config: &PipelineConfig,
) -> (Vec<VerifiedRecord>, RemovalReport) {
    let mut report = RemovalReport::default();
    let mut kept: Vec<VerifiedRecord> = Vec::with_capacity(records.len());

    for verified in records {
        let url_count = verified.record.urls.len();
        let too_few = url_count < config.min_urls;
        let too_many = url_count > config.max_urls;
        let unnamed = verified.record.names.is_empty();

        if too_few {
            report.no_url += 1;
        }
        if too_many {
            report.too_many_urls += 1;
        }
        if unnamed {
            report.no_name += 1;
        }

        if too_few || too_many || unnamed {
            report.removed += 1;
            tracing::debug!(
                id = %verified.record.id,
                url_count,
                unnamed,
                "removing record during filtering"
            );
        } else {
            kept.push(verified);
        }
    }

    report.kept = kept.len();
    tracing::info!(
        kept = report.kept,
        removed = report.removed,
        no_url = report.no_url,
        too_many_urls = report.too_many_urls,
        no_name = report.no_name,
        "filtered records"
    );

    (kept, report)
}
