//! Tests for CLI option handling.

use bioinv_core::DedupKey;

use crate::{pipeline_config, FilterOpts, VerifyOpts};

fn verify_opts() -> VerifyOpts {
    VerifyOpts {
        num_tries: 3,
        backoff_factor: 0.5,
        concurrency_limit: Some(4),
        archive_base_url: None,
    }
}

fn filter_opts() -> FilterOpts {
    FilterOpts {
        min_urls: 1,
        max_urls: 2,
        min_prob: 0.9,
        dedup_keys: "best_name,url".to_owned(),
    }
}

#[test]
fn builds_config_from_both_option_groups() {
    let config = pipeline_config(Some(&verify_opts()), Some(&filter_opts())).unwrap();
    assert_eq!(config.num_tries, 3);
    assert_eq!(config.concurrency_limit, 4);
    assert_eq!(config.dedup_keys, vec![DedupKey::BestName, DedupKey::Url]);
}

#[test]
fn missing_concurrency_falls_back_to_host_parallelism() {
    let mut opts = verify_opts();
    opts.concurrency_limit = None;
    let config = pipeline_config(Some(&opts), None).unwrap();
    assert!(config.concurrency_limit >= 1);
}

#[test]
fn out_of_range_values_are_fatal() {
    let mut opts = filter_opts();
    opts.min_prob = 2.0;
    assert!(pipeline_config(None, Some(&opts)).is_err());

    let mut opts = filter_opts();
    opts.min_urls = 5;
    opts.max_urls = 2;
    assert!(pipeline_config(None, Some(&opts)).is_err());

    let mut opts = verify_opts();
    opts.num_tries = 0;
    assert!(pipeline_config(Some(&opts), None).is_err());

    let mut opts = verify_opts();
    opts.backoff_factor = -0.5;
    assert!(pipeline_config(Some(&opts), None).is_err());
}

#[test]
fn unknown_dedup_key_is_fatal() {
    let mut opts = filter_opts();
    opts.dedup_keys = "best_name,title".to_owned();
    assert!(pipeline_config(None, Some(&opts)).is_err());
}
