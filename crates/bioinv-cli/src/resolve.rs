//! Resolution command handler: filter, name resolution, dedup, review.

use std::fs;
use std::path::Path;

use anyhow::Context;
use bioinv_resolve::resolve_inventory;

use crate::FilterOpts;

/// Reads the verify-stage table, runs the resolution pipeline, and writes
/// the final inventory table.
pub(crate) fn run_resolve(file: &Path, out_dir: &Path, opts: &FilterOpts) -> anyhow::Result<()> {
    let config = crate::pipeline_config(None, Some(opts))?;

    let records = crate::io::read_verified(file)?;
    tracing::info!(records = records.len(), file = %file.display(), "loaded verified records");

    let output = resolve_inventory(records, &config);

    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;
    let out_path = out_dir.join("inventory.csv");
    crate::io::write_inventory(&out_path, &output.inventory)?;

    println!(
        "Done. Wrote {} inventory rows to {} ({} auto-accepted, {} flagged for review, {} records removed).",
        output.inventory.len(),
        out_path.display(),
        output.review.auto_accepted,
        output.review.needs_review,
        output.removals.removed,
    );
    Ok(())
}
