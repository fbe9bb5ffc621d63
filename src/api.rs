//! Synchronous client for the **REST Countries API (v3.1)**.
//!
//! Only the `region/{region}` endpoint is used. The whole region comes back in a
//! single response (no pagination), as a JSON array of country objects.
//!
//! ### Notes
//! - Exactly one GET per fetch; there is no retry.
//! - A non-success status is logged but the body is still parsed, so an error
//!   payload surfaces as a parse error with context.
//! - Network timeouts use a sane default (30s) and can be adjusted with
//!   [`Client::with_timeout`].
//!
//! Typical usage:
//! ```no_run
//! # use rcountries::Client;
//! let client = Client::default();
//! let fetched = client.fetch_region("europe")?;
//! println!("{} countries (HTTP {})", fetched.records.len(), fetched.status);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::models::RawRecord;
use anyhow::{Context, Result, anyhow, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_REGION: &str = "europe";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

/// Response of a region fetch: HTTP status plus the parsed country objects.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub records: Vec<RawRecord>,
}

// Allow -, _, . unescaped in the region segment
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

impl Client {
    /// Client with a total request timeout of `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = HttpClient::builder()
            .timeout(timeout) // total request timeout
            .connect_timeout(Duration::from_secs(10).min(timeout)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("rcountries/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            http,
        }
    }

    /// Point the client at another API root (mirrors, local fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// URL of the region endpoint, e.g. `https://restcountries.com/v3.1/region/europe`.
    pub fn region_url(&self, region: &str) -> String {
        let seg = percent_encoding::utf8_percent_encode(region.trim(), SAFE);
        format!("{}/region/{}", self.base_url.trim_end_matches('/'), seg)
    }

    /// Fetch every country of `region` with a single GET.
    ///
    /// ### Errors
    /// - Network/HTTP transport error
    /// - Body is not JSON, or not an array of objects
    pub fn fetch_region(&self, region: &str) -> Result<Fetched> {
        if region.trim().is_empty() {
            bail!("region must not be empty");
        }
        let url = self.region_url(region);
        log::info!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("GET {}", url))?;
        let status = resp.status();
        if !status.is_success() {
            log::warn!("GET {url} returned HTTP {status}; parsing the body anyway");
        }
        let body = resp.text().with_context(|| format!("read body of {}", url))?;
        let records = parse_records(&body).with_context(|| format!("GET {}", url))?;
        log::info!("received {} country records", records.len());

        Ok(Fetched {
            status: status.as_u16(),
            records,
        })
    }
}

/// Parse a response body into country objects.
pub fn parse_records(body: &str) -> Result<Vec<RawRecord>> {
    let v: Value = serde_json::from_str(body).context("decode json")?;
    records_from_value(v)
}

/// Accept only a top-level array whose elements are all objects.
pub fn records_from_value(v: Value) -> Result<Vec<RawRecord>> {
    let arr = match v {
        Value::Array(arr) => arr,
        Value::Object(obj) => {
            // The API reports errors as {"status": 404, "message": "Not Found"}.
            let msg = obj
                .get("message")
                .map(|m| m.to_string())
                .unwrap_or_else(|| "<no message>".into());
            bail!("unexpected response shape: object instead of array (message: {msg})");
        }
        other => bail!("unexpected response shape: {} instead of array", kind(&other)),
    };
    arr.into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(anyhow!("record {} is {} instead of an object", i, kind(&other))),
        })
        .collect()
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
