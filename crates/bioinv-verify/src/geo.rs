//! Best-effort geolocation of responding hosts.
//!
//! Providers are queried in priority order and the first well-formed answer
//! wins. Every failure mode — DNS, HTTP, provider-reported miss, malformed
//! body — degrades to `None`; geolocation never fails a verification.

use std::net::IpAddr;
use std::time::Duration;

use bioinv_core::GeoLocation;
use reqwest::Client;
use serde_json::Value;
use tokio::net::lookup_host;

use crate::error::CheckError;

/// One geolocation-by-IP HTTP API. `endpoint` contains an `{ip}`
/// placeholder substituted per lookup.
#[derive(Debug, Clone)]
pub struct GeoProvider {
    pub name: String,
    pub endpoint: String,
}

/// Default provider list, in priority order.
#[must_use]
pub fn default_providers() -> Vec<GeoProvider> {
    vec![
        GeoProvider {
            name: "ip-api".to_owned(),
            endpoint: "http://ip-api.com/json/{ip}".to_owned(),
        },
        GeoProvider {
            name: "ipwho.is".to_owned(),
            endpoint: "https://ipwho.is/{ip}".to_owned(),
        },
    ]
}

/// Queries geolocation providers for the IP behind a responding host.
pub struct GeoResolver {
    client: Client,
    providers: Vec<GeoProvider>,
}

impl GeoResolver {
    /// Creates a resolver with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        providers: Vec<GeoProvider>,
    ) -> Result<Self, CheckError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, providers })
    }

    /// Resolves `host` to an IP and asks each provider in turn. Returns the
    /// first well-formed location, or `None` when every provider fails.
    pub async fn resolve(&self, host: &str) -> Option<GeoLocation> {
        let ip = resolve_ip(host).await?;

        for provider in &self.providers {
            let url = provider.endpoint.replace("{ip}", &ip.to_string());
            match self.query_provider(provider, &url).await {
                Some(location) => {
                    tracing::debug!(host, provider = %provider.name, country = %location.country,
                        "geolocation resolved");
                    return Some(location);
                }
                None => {
                    tracing::debug!(host, provider = %provider.name, "geolocation provider miss");
                }
            }
        }
        None
    }

    async fn query_provider(&self, provider: &GeoProvider, url: &str) -> Option<GeoLocation> {
        let response = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(provider = %provider.name, status = response.status().as_u16(),
                    "geolocation provider returned non-success status");
                return None;
            }
            Err(e) => {
                tracing::debug!(provider = %provider.name, error = %e,
                    "geolocation provider request failed");
                return None;
            }
        };

        let body: Value = response.json().await.ok()?;
        parse_location(&body)
    }
}

/// Resolves a hostname to one IP via system DNS. Bare IP literals pass
/// through without a lookup.
async fn resolve_ip(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }
    // lookup_host needs a port; which one is irrelevant for A/AAAA lookup.
    match lookup_host((host, 443u16)).await {
        Ok(mut addrs) => addrs.next().map(|a| a.ip()),
        Err(e) => {
            tracing::debug!(host, error = %e, "DNS lookup failed");
            None
        }
    }
}

/// Extracts a location from a provider response, tolerating the field-name
/// differences between providers. A provider-reported failure flag, a
/// missing field, or a non-numeric coordinate all yield `None`.
fn parse_location(body: &Value) -> Option<GeoLocation> {
    // ip-api signals misses with {"status": "fail"}, ipwho.is with
    // {"success": false}.
    if body.get("status").and_then(Value::as_str) == Some("fail")
        || body.get("success").and_then(Value::as_bool) == Some(false)
    {
        return None;
    }

    let country = body
        .get("country")
        .or_else(|| body.get("country_name"))
        .and_then(Value::as_str)?;
    let latitude = body
        .get("lat")
        .or_else(|| body.get("latitude"))
        .and_then(Value::as_f64)?;
    let longitude = body
        .get("lon")
        .or_else(|| body.get("longitude"))
        .and_then(Value::as_f64)?;

    Some(GeoLocation {
        country: country.to_owned(),
        latitude,
        longitude,
    })
}
