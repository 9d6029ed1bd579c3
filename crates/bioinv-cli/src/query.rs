//! EuropePMC query command handler.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context};
use bioinv_epmc::{substitute_date_range, EpmcClient};
use chrono::Utc;
use regex::Regex;

use crate::HttpOpts;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}(-\d{2}(-\d{2})?)?$").expect("valid date regex"));

/// Runs a search against EuropePMC and writes the results table plus a
/// stamp file with today's date, for use as `--from-date` on the next run.
pub(crate) async fn run_query(
    query_arg: &str,
    from_date: &str,
    page_size: u32,
    out_dir: &Path,
    http: &HttpOpts,
) -> anyhow::Result<()> {
    // The query argument may be the query itself or a path to a file
    // holding it.
    let template = if Path::new(query_arg).is_file() {
        fs::read_to_string(query_arg)
            .with_context(|| format!("cannot read query file {query_arg}"))?
            .trim()
            .to_owned()
    } else {
        query_arg.to_owned()
    };

    if !DATE_RE.is_match(from_date) {
        bail!("from-date \"{from_date}\" must be one of YYYY, YYYY-MM, or YYYY-MM-DD");
    }

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let query = substitute_date_range(&template, from_date, &today);

    let client = EpmcClient::new(http.timeout_secs, &http.user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build EuropePMC client: {e}"))?;

    tracing::info!(query = %query, page_size, "querying EuropePMC");
    let articles = client.search_all(&query, page_size).await?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;
    let csv_out: PathBuf = out_dir.join("new_query_results.csv");
    let date_out: PathBuf = out_dir.join("last_query_date.txt");

    crate::io::write_articles(&csv_out, &articles)?;
    fs::write(&date_out, format!("{today}\n"))
        .with_context(|| format!("cannot write {}", date_out.display()))?;

    println!(
        "Done. Wrote {} articles to {}.",
        articles.len(),
        csv_out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_date_forms() {
        for date in ["2011", "2011-06", "2011-06-15"] {
            assert!(DATE_RE.is_match(date), "should accept {date}");
        }
    }

    #[test]
    fn rejects_invalid_date_forms() {
        for date in ["11", "2011-6", "2011/06/15", "yesterday", "2011-06-15-01"] {
            assert!(!DATE_RE.is_match(date), "should reject {date}");
        }
    }
}
