//! URL verification command handler.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bioinv_verify::{default_providers, ArchiveClient, GeoResolver, UrlChecker, UrlVerifier};

use crate::{HttpOpts, VerifyOpts};

/// Reads prediction records, verifies every extracted URL, and writes the
/// enriched table under the input file's basename in `out_dir`.
pub(crate) async fn run_verify(
    file: &Path,
    out_dir: &Path,
    http: &HttpOpts,
    opts: &VerifyOpts,
) -> anyhow::Result<()> {
    let config = crate::pipeline_config(Some(opts), None)?;

    let records = crate::io::read_predictions(file)?;
    tracing::info!(records = records.len(), file = %file.display(), "loaded prediction records");

    let verifier = build_verifier(http, opts, config.concurrency_limit)?;
    let verified = verifier.verify_records(records).await;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;
    let out_path = output_path(out_dir, file)?;
    crate::io::write_verified(&out_path, &verified)?;

    println!("Done. Wrote output to {}.", out_path.display());
    Ok(())
}

/// Builds the verifier from command-line options: the retrying URL checker,
/// the geolocation provider chain, and the archive availability client.
pub(crate) fn build_verifier(
    http: &HttpOpts,
    opts: &VerifyOpts,
    concurrency_limit: usize,
) -> anyhow::Result<UrlVerifier> {
    let checker = UrlChecker::new(
        http.timeout_secs,
        &http.user_agent,
        opts.num_tries,
        opts.backoff_factor,
    )
    .map_err(|e| anyhow::anyhow!("failed to build URL checker: {e}"))?;

    let geo = GeoResolver::new(http.timeout_secs, &http.user_agent, default_providers())
        .map_err(|e| anyhow::anyhow!("failed to build geolocation resolver: {e}"))?;

    let archive = match &opts.archive_base_url {
        Some(base_url) => ArchiveClient::with_base_url(http.timeout_secs, &http.user_agent, base_url),
        None => ArchiveClient::new(http.timeout_secs, &http.user_agent),
    }
    .map_err(|e| anyhow::anyhow!("failed to build archive client: {e}"))?;

    Ok(UrlVerifier::new(checker, geo, archive, concurrency_limit))
}

/// Output file path reusing the input file's basename.
pub(crate) fn output_path(out_dir: &Path, input: &Path) -> anyhow::Result<PathBuf> {
    let name = input
        .file_name()
        .with_context(|| format!("input path {} has no file name", input.display()))?;
    Ok(out_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_reuses_input_basename() {
        let path = output_path(Path::new("out/checked_urls"), Path::new("out/urls/predictions.csv"))
            .unwrap();
        assert_eq!(path, Path::new("out/checked_urls/predictions.csv"));
    }

    #[test]
    fn output_path_rejects_bare_directory_input() {
        assert!(output_path(Path::new("out"), Path::new("..")).is_err());
    }
}
