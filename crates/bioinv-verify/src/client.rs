//! Liveness checks for extracted URLs.

use std::time::Duration;

use bioinv_core::CheckOutcome;
use reqwest::redirect::Policy;
use reqwest::{Client, Url};

use crate::error::CheckError;
use crate::retry::retry_with_backoff;

/// Checks whether extracted URLs respond, with bounded retries.
///
/// Issues HEAD requests without following redirects, so the raw status of
/// the first hop (e.g. 301) is what gets recorded. Every outcome — including
/// an exhausted retry budget — becomes a [`CheckOutcome`] value; this client
/// never fails the pipeline.
pub struct UrlChecker {
    client: Client,
    /// Total attempts per URL (first try included).
    num_tries: u32,
    /// Base back-off in seconds; the wait doubles after each failed attempt.
    backoff_factor: f64,
}

impl UrlChecker {
    /// Creates a checker with configured timeout, `User-Agent`, and retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        num_tries: u32,
        backoff_factor: f64,
    ) -> Result<Self, CheckError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::none())
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            num_tries,
            backoff_factor,
        })
    }

    /// Checks one URL and classifies the terminal outcome.
    ///
    /// A URL that does not parse is recorded as a network-classified outcome
    /// without sending anything. Responses with status < 400 are
    /// [`CheckOutcome::Success`], >= 400 are [`CheckOutcome::ClientFailure`];
    /// neither is retried. Requests that never complete are retried up to
    /// `num_tries` total attempts, after which the last error message is
    /// recorded.
    pub async fn check(&self, url: &str) -> CheckOutcome {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return CheckOutcome::NetworkError(
                    CheckError::InvalidUrl {
                        url: url.to_owned(),
                        reason: e.to_string(),
                    }
                    .to_string(),
                );
            }
        };

        let result = retry_with_backoff(self.num_tries, self.backoff_factor, || {
            let parsed = parsed.clone();
            async move {
                let response = self.client.head(parsed).send().await?;
                Ok(response.status().as_u16())
            }
        })
        .await;

        match result {
            Ok(status) if status < 400 => CheckOutcome::Success(status),
            Ok(status) => CheckOutcome::ClientFailure(status),
            Err(err) => CheckOutcome::NetworkError(err.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
