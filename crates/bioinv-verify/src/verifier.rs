//! Bounded-concurrency orchestration of per-URL verification.

use bioinv_core::{PredictionRecord, UrlVerificationResult, VerifiedRecord};
use futures::stream::{self, StreamExt};
use reqwest::Url;

use crate::archive::ArchiveClient;
use crate::client::UrlChecker;
use crate::geo::GeoResolver;

/// Drives every URL across all records through check → geolocate → archive
/// lookup, with at most `concurrency_limit` URLs in flight.
///
/// URLs are independent units of work: as one completes, the next queued
/// URL is dispatched immediately rather than in fixed-size rounds, so slow
/// hosts do not stall the pool. Back-off sleeps block only the future for
/// that URL. Results land in per-URL slots keyed by (record, url) index, so
/// aggregation needs no locking.
pub struct UrlVerifier {
    checker: UrlChecker,
    geo: GeoResolver,
    archive: ArchiveClient,
    concurrency_limit: usize,
}

impl UrlVerifier {
    #[must_use]
    pub fn new(
        checker: UrlChecker,
        geo: GeoResolver,
        archive: ArchiveClient,
        concurrency_limit: usize,
    ) -> Self {
        Self {
            checker,
            geo,
            archive,
            concurrency_limit,
        }
    }

    /// Verifies every URL of every record.
    ///
    /// Records with no URLs pass through with an empty verification list;
    /// whether that is acceptable is the record filter's call, not an error
    /// here. Output order matches input order regardless of completion
    /// order.
    pub async fn verify_records(&self, records: Vec<PredictionRecord>) -> Vec<VerifiedRecord> {
        let work: Vec<(usize, usize, String)> = records
            .iter()
            .enumerate()
            .flat_map(|(record_idx, record)| {
                record
                    .urls
                    .iter()
                    .enumerate()
                    .map(move |(url_idx, url)| (record_idx, url_idx, url.clone()))
            })
            .collect();

        tracing::info!(
            records = records.len(),
            urls = work.len(),
            concurrency = self.concurrency_limit,
            "verifying extracted URLs"
        );

        // One pre-allocated slot per (record, url); each is written exactly
        // once when its check completes.
        let mut slots: Vec<Vec<Option<UrlVerificationResult>>> = records
            .iter()
            .map(|record| vec![None; record.urls.len()])
            .collect();

        let results: Vec<(usize, usize, UrlVerificationResult)> = stream::iter(work)
            .map(|(record_idx, url_idx, url)| async move {
                let result = self.verify_one(&url).await;
                (record_idx, url_idx, result)
            })
            .buffer_unordered(self.concurrency_limit.max(1))
            .collect()
            .await;

        for (record_idx, url_idx, result) in results {
            slots[record_idx][url_idx] = Some(result);
        }

        records
            .into_iter()
            .zip(slots)
            .map(|(record, record_slots)| VerifiedRecord {
                record,
                verifications: record_slots
                    .into_iter()
                    .map(|slot| slot.expect("every URL slot is populated exactly once"))
                    .collect(),
            })
            .collect()
    }

    /// Verifies a single URL: liveness check, then geolocation of the
    /// responding host (successful checks only), then an archive lookup
    /// regardless of live status.
    pub async fn verify_one(&self, url: &str) -> UrlVerificationResult {
        let outcome = self.checker.check(url).await;

        let geo = if outcome.is_success() {
            match host_of(url) {
                Some(host) => self.geo.resolve(&host).await,
                None => None,
            }
        } else {
            None
        };

        let archived_url = self.archive.lookup(url).await;

        tracing::debug!(url, status = %outcome, geo = geo.is_some(),
            archived = archived_url.is_some(), "verified URL");

        UrlVerificationResult {
            url: url.to_owned(),
            outcome,
            geo,
            archived_url,
        }
    }
}

/// Host component of a URL, if it parses.
fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_of_extracts_hostname() {
        assert_eq!(
            host_of("https://www.ebi.ac.uk/path?q=1"),
            Some("www.ebi.ac.uk".to_owned())
        );
        assert_eq!(host_of("http://127.0.0.1:8080/"), Some("127.0.0.1".to_owned()));
        assert_eq!(host_of("not a url"), None);
    }
}
