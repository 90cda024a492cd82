// ai
//! 🪙📡🔄 CoinGecko Source — one GET, three chances, zero jitter.
//!
//! COLD OPEN — EXT. THE PUBLIC INTERNET — EVERY SIX HOURS
//!
//! The scheduler wakes the pipeline. The pipeline waits two seconds (manners).
//! It asks for ten coins. Sometimes it gets ten coins. Sometimes it gets a 503
//! and a stack trace in HTML. Sometimes it gets told to come back in thirty seconds.
//! This module handles all three with the emotional range of a vending machine.
//!
//! 🧠 Knowledge graph:
//! - `CoinGeckoSourceConfig`: endpoint, query knobs, timeout, pre-call delay, retry policy
//! - `FetchError`: `Throttled` and `Status` are retryable; `Transport`, `Decode`, `InvalidUrl` are not
//! - `CoinGeckoSource::fetch_markets`: `retry_with_backoff` around `fetch_once`
//! - On 429 the attempt sleeps for `Retry-After` itself, then the retry wrapper adds its own backoff

use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::common::MarketRecord;
use crate::retry::{RetryPolicy, retry_with_backoff};

// ============================================================
//  🔧 CoinGeckoSourceConfig — knobs, dials, and a polite delay
// ============================================================

/// 🔧 Configuration for the market-data fetch. Every default matches what the
/// scheduled pipeline has always sent, so an empty `[market_api]` table is a valid config.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CoinGeckoSourceConfig {
    /// 📡 API root, no trailing `/coins/markets`. Tests point this at a mock server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_order")]
    pub order: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub sparkline: bool,
    /// ⏱️ whole-request timeout, seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 🙏 fixed sleep before EVERY attempt — the free tier allows ~30 calls a minute
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// ⏳ how long to back off on a 429 that forgot to say how long
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

fn default_order() -> String {
    "market_cap_desc".to_string()
}

fn default_per_page() -> u32 {
    10
}

fn default_page() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_request_delay_ms() -> u64 {
    2000
}

fn default_retry_after_secs() -> u64 {
    30
}

impl Default for CoinGeckoSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            vs_currency: default_vs_currency(),
            order: default_order(),
            per_page: default_per_page(),
            page: default_page(),
            sparkline: false,
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            default_retry_after_secs: default_retry_after_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

// ============================================================
//  🏷️ FetchError — the failures we branch on
// ============================================================

/// 💀 Everything that can go wrong asking for coin prices, sorted by whether trying
/// again could possibly help.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// ⏳ HTTP 429. We already waited `retry_after` before returning this.
    #[error("server throttled request (HTTP 429), waited {retry_after:?} before retrying")]
    Throttled { retry_after: Duration },
    /// 🚫 Any other HTTP status >= 400.
    #[error("HTTP error {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// 🔌 Connection refused, DNS, timeout, TLS. Not retried: the scheduler retries the whole step.
    #[error("request to the market API failed: {0}")]
    Transport(reqwest::Error),
    /// 🧩 A 2xx whose body is not a JSON array of coins.
    #[error("market API response was not a JSON array of coins: {0}")]
    Decode(serde_json::Error),
    #[error("invalid market API url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// 🔄 Only HTTP-level failures earn another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. } | Self::Status { .. })
    }
}

// ============================================================
//  🪙 CoinGeckoSource — the fetcher
// ============================================================

/// 🪙 Fetches one page of market data. Holds one `reqwest::Client`, reused across attempts.
#[derive(Debug)]
pub struct CoinGeckoSource {
    client: reqwest::Client,
    config: CoinGeckoSourceConfig,
}

impl CoinGeckoSource {
    /// 🚀 Build the HTTP client with the configured timeout. No request goes out yet.
    pub fn new(config: CoinGeckoSourceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("dvx/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("💀 The HTTP client refused to be born. The TLS stack wept. Probably a cursed system cert store.")?;
        Ok(Self { client, config })
    }

    /// 🔗 `{base_url}/coins/markets?vs_currency=..&order=..&per_page=..&page=..&sparkline=..`
    pub fn markets_url(&self) -> Result<reqwest::Url, FetchError> {
        let the_raw_url = format!("{}/coins/markets", self.config.base_url.trim_end_matches('/'));
        let mut the_url = reqwest::Url::parse(&the_raw_url).map_err(|e| FetchError::InvalidUrl {
            url: the_raw_url.clone(),
            reason: e.to_string(),
        })?;
        the_url
            .query_pairs_mut()
            .append_pair("vs_currency", &self.config.vs_currency)
            .append_pair("order", &self.config.order)
            .append_pair("per_page", &self.config.per_page.to_string())
            .append_pair("page", &self.config.page.to_string())
            .append_pair("sparkline", if self.config.sparkline { "true" } else { "false" });
        Ok(the_url)
    }

    /// 📡 Fetch the configured page, retrying HTTP-level failures per `config.retry`.
    pub async fn fetch_markets(&self) -> Result<Vec<MarketRecord>, FetchError> {
        retry_with_backoff(&self.config.retry, "market fetch", FetchError::is_retryable, |attempt| {
            self.fetch_once(attempt)
        })
        .await
    }

    /// 🎯 Exactly one attempt: polite delay, GET, classify, decode.
    async fn fetch_once(&self, attempt: u32) -> Result<Vec<MarketRecord>, FetchError> {
        // -- 🙏 the rate-limit tax, paid up front on every attempt
        if self.config.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }

        let the_url = self.markets_url()?;
        debug!("📡 attempt {} → GET {}", attempt, the_url);
        let response = self
            .client
            .get(the_url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let the_status = response.status();
        if the_status == StatusCode::TOO_MANY_REQUESTS {
            let the_retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or_else(|| Duration::from_secs(self.config.default_retry_after_secs));
            warn!(
                "⚠️ Server throttled request — waiting {:?} before retrying...",
                the_retry_after
            );
            tokio::time::sleep(the_retry_after).await;
            return Err(FetchError::Throttled {
                retry_after: the_retry_after,
            });
        }

        if the_status.is_client_error() || the_status.is_server_error() {
            // -- 📜 the body is evidence. keep it, even if reading it fails halfway.
            let the_body = response.text().await.unwrap_or_default();
            error!("❌ HTTP Error {}: {}", the_status, the_body);
            return Err(FetchError::Status {
                status: the_status,
                body: the_body,
            });
        }

        let the_body = response.text().await.map_err(FetchError::Transport)?;
        let the_records: Vec<MarketRecord> = serde_json::from_str(&the_body).map_err(FetchError::Decode)?;
        info!("✅ Successfully fetched {} records.", the_records.len());
        Ok(the_records)
    }
}

// ============================================================
//  🧪 Tests — a mock server that can be as rude as the real one
// ============================================================
