// ai
//! 🕷️ Glue Crawler — start it, then ask "are you done yet" until it is.
//!
//! The crawler itself is defined in AWS (by hand or by infrastructure-as-code).
//! We only poke it. Two calls: `StartCrawler` and `GetCrawler`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::trace;

use crate::backends::{Crawler, CrawlerSnapshot, CrawlerState};

/// 🔧 The `[catalog]` section.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CatalogConfig {
    /// 🕷️ no crawler name, no crawl stage
    #[serde(default)]
    pub crawler_name: Option<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// ⏱️ give up polling after this long. The crawler keeps going; we just stop watching.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_max_wait_secs() -> u64 {
    900
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            crawler_name: None,
            poll_interval_secs: default_poll_interval_secs(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct GlueCrawler {
    client: aws_sdk_glue::Client,
}

impl GlueCrawler {
    pub(crate) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_glue::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl Crawler for GlueCrawler {
    async fn start_crawler(&self, name: &str) -> Result<()> {
        self.client
            .start_crawler()
            .name(name)
            .send()
            .await
            .with_context(|| format!("💀 Glue refused to start crawler '{}'. Already running? Misspelled? Both?", name))?;
        Ok(())
    }

    async fn crawler_snapshot(&self, name: &str) -> Result<CrawlerSnapshot> {
        let the_response = self
            .client
            .get_crawler()
            .name(name)
            .send()
            .await
            .with_context(|| format!("💀 Could not read the state of crawler '{}'", name))?;
        let the_crawler = the_response
            .crawler()
            .with_context(|| format!("💀 Glue answered about crawler '{}' without describing a crawler", name))?;

        let the_state = the_crawler
            .state()
            .map(|state| CrawlerState::from_wire(state.as_str()))
            .unwrap_or_else(|| CrawlerState::Other("UNKNOWN".to_string()));
        // -- 🧾 only a FAILED last crawl counts as a failure worth reporting
        let the_failure = the_crawler.last_crawl().and_then(|last| {
            let is_failed = last.status().map(|status| status.as_str() == "FAILED").unwrap_or(false);
            is_failed.then(|| last.error_message().unwrap_or("no error message").to_string())
        });
        trace!("🕷️ crawler '{}' is {}", name, the_state);
        Ok(CrawlerSnapshot {
            state: the_state,
            last_crawl_failure: the_failure,
        })
    }
}
