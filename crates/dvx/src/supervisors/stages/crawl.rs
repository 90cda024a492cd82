// ai
//! 📚 Crawl — kick the catalog crawler, then wait for it to say READY.
//!
//! The crawler reads the silver prefix and (re)writes the table definition the
//! query stage depends on. We only start it and watch. Polls every
//! `catalog.poll_interval_secs`, stops watching after `catalog.max_wait_secs`.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{info, warn};

use super::{Stage, StageContext};
use crate::backends::{Crawler, CrawlerState};

#[derive(Debug, Clone, Copy)]
pub(crate) struct CrawlStage;

#[async_trait]
impl Stage for CrawlStage {
    fn name(&self) -> &'static str {
        "crawl"
    }

    async fn run(&self, context: &StageContext) -> Result<()> {
        let catalog = &context.config.catalog;
        let the_name = catalog
            .crawler_name
            .as_deref()
            .context("💀 catalog.crawler_name is not set (GLUE_CRAWLER_NAME). No crawler, no table.")?;

        info!("🕷️ Starting Glue Crawler: {}", the_name);
        context.crawler.start_crawler(the_name).await?;
        info!("🕷️ Crawler {} started successfully", the_name);

        let the_poll_interval = Duration::from_secs(catalog.poll_interval_secs);
        let the_deadline = Instant::now() + Duration::from_secs(catalog.max_wait_secs);
        loop {
            let the_snapshot = context.crawler.crawler_snapshot(the_name).await?;
            if the_snapshot.state == CrawlerState::Ready {
                if let Some(failure) = the_snapshot.last_crawl_failure {
                    warn!("⚠️ Crawler {} reports its last crawl failed: {}", the_name, failure);
                }
                info!("✅ Crawler {} completed successfully", the_name);
                return Ok(());
            }
            if Instant::now() >= the_deadline {
                bail!(
                    "💀 Crawler {} still {} after {}s. It may finish on its own; we stopped watching.",
                    the_name,
                    the_snapshot.state,
                    catalog.max_wait_secs
                );
            }
            info!("⏳ Crawler status: {}", the_snapshot.state);
            tokio::time::sleep(the_poll_interval).await;
        }
    }
}
