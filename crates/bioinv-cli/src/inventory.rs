//! Combined verify + resolve command handler.

use std::fs;
use std::path::Path;

use anyhow::Context;
use bioinv_resolve::resolve_inventory;

use crate::{FilterOpts, HttpOpts, VerifyOpts};

/// Runs the whole pipeline in one pass: verification of every extracted
/// URL, then the resolution stages. Writes the intermediate verified table
/// alongside the final inventory so a run stays auditable.
pub(crate) async fn run_inventory(
    file: &Path,
    out_dir: &Path,
    http: &HttpOpts,
    verify_opts: &VerifyOpts,
    filter_opts: &FilterOpts,
) -> anyhow::Result<()> {
    let config = crate::pipeline_config(Some(verify_opts), Some(filter_opts))?;

    let records = crate::io::read_predictions(file)?;
    tracing::info!(records = records.len(), file = %file.display(), "loaded prediction records");

    let verifier = crate::verify::build_verifier(http, verify_opts, config.concurrency_limit)?;
    let verified = verifier.verify_records(records).await;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;
    let verified_path = out_dir.join("verified.csv");
    crate::io::write_verified(&verified_path, &verified)?;

    let output = resolve_inventory(verified, &config);
    let inventory_path = out_dir.join("inventory.csv");
    crate::io::write_inventory(&inventory_path, &output.inventory)?;

    println!(
        "Done. Wrote {} inventory rows to {} ({} auto-accepted, {} flagged for review, {} records removed).",
        output.inventory.len(),
        inventory_path.display(),
        output.review.auto_accepted,
        output.review.needs_review,
        output.removals.removed,
    );
    Ok(())
}
