//! 🎬 *[camera pans across a dimly lit server room]*
//! 🎬 *[dramatic orchestral music swells]*
//! 🎬 "In a world where stages fail at 6 a.m...."
//! 🎬 "One supervisor dared to try them again."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The Supervisor module — part middle manager, part scheduler, part that one
//! coworker who says "have you tried running it again?" and is, annoyingly, right.
//!
//! 🧠 Knowledge graph:
//! - `run_stage`: one stage, one attempt. What `dvx extract` and friends call.
//! - `run_pipeline`: extract → transform → crawl → query → notify, each stage retried
//!   `runtime.step_retries` more times with `runtime.step_retry_delay_secs` between tries.
//!   The first stage to run out of retries stops the chain; later stages never run.
//! - Stages are private minions. Only `StageKind` leaves this module.

mod stages;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app_config::AppConfig;
pub use stages::StageKind;
use stages::{Stage, StageContext};

/// 📦 The Supervisor: owns the stage context and decides what runs, and how often.
#[derive(Debug)]
pub(crate) struct Supervisor {
    context: StageContext,
}

impl Supervisor {
    /// 🚀 Wire up the real backends from config.
    pub(crate) async fn connect(app_config: AppConfig) -> Result<Self> {
        Ok(Self {
            context: StageContext::connect(app_config).await?,
        })
    }

    #[cfg(test)]
    fn with_context(context: StageContext) -> Self {
        Self { context }
    }

    /// 🎯 Run a single stage once.
    pub(crate) async fn run_stage(&self, stage: StageKind) -> Result<()> {
        info!("🚀 Running stage: {}", stage);
        stage
            .run(&self.context)
            .await
            .with_context(|| format!("💀 Stage '{}' failed", stage))?;
        info!("✅ Stage {} completed successfully.", stage);
        Ok(())
    }

    /// 🔁 Run one stage with the step-level retry policy.
    async fn run_stage_with_retries(&self, stage: StageKind) -> Result<()> {
        let runtime = &self.context.config.runtime;
        let the_total_attempts = runtime.step_retries + 1;
        let mut the_attempt = 1;
        loop {
            match self.run_stage(stage).await {
                Ok(()) => return Ok(()),
                Err(err) if the_attempt < the_total_attempts => {
                    warn!(
                        "⚠️ Stage {} failed (attempt {}/{}): {:#} — retrying in {}s",
                        stage, the_attempt, the_total_attempts, err, runtime.step_retry_delay_secs
                    );
                    tokio::time::sleep(Duration::from_secs(runtime.step_retry_delay_secs)).await;
                    the_attempt += 1;
                }
                Err(err) => {
                    return Err(err.context(format!(
                        "💀 Pipeline stopped at stage '{}' after {} attempt(s)",
                        stage, the_attempt
                    )));
                }
            }
        }
    }

    /// 🎬 The whole show, in order. Stops at the first stage that exhausts its retries.
    pub(crate) async fn run_pipeline(&self) -> Result<()> {
        for stage in StageKind::PIPELINE {
            self.run_stage_with_retries(stage).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::stages::test_support::*;
    use super::*;
    use crate::backends::{InMemoryCrawler, InMemoryQueryEngine, QueryResults};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn the_one_where_the_whole_pipeline_runs_start_to_finish() -> Result<()> {
        let the_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/markets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(market_payload()))
            .expect(1)
            .mount(&the_server)
            .await;
        let the_dir = tempfile::tempdir()?;
        let the_fakes = Fakes {
            crawler: InMemoryCrawler::scripted([crate::backends::CrawlerState::Running]),
            query_engine: InMemoryQueryEngine::scripted(Vec::new(), QueryResults::default()),
            ..Fakes::default()
        };
        let the_supervisor = Supervisor::with_context(in_memory_context(
            test_config(&the_server.uri(), the_dir.path()),
            &the_fakes,
        )?);

        the_supervisor.run_pipeline().await?;

        assert_eq!(the_fakes.store.keys(BRONZE_BUCKET).await.len(), 1);
        assert_eq!(the_fakes.store.keys(SILVER_BUCKET).await.len(), 1);
        assert_eq!(the_fakes.crawler.started().await.len(), 1);
        assert_eq!(the_fakes.query_engine.submitted().await.len(), 1);

        let the_entries = the_supervisor.context.metadata_log.entries()?;
        let the_summary: Vec<(&str, i64, &str)> = the_entries
            .iter()
            .map(|entry| (entry.source_api.as_str(), entry.record_count, entry.status.as_str()))
            .collect();
        // 🥉 four raw rows in, 🥈 two survive dedupe + null drop
        assert_eq!(
            the_summary,
            vec![("CoinGecko", 4, "SUCCESS"), ("coingecko_silver", 2, "SUCCESS")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_extract_keeps_failing_and_nothing_downstream_runs() -> Result<()> {
        let the_server = MockServer::start().await;
        // 🧮 1 try + 2 step retries, each with 3 fetch attempts
        Mock::given(method("GET"))
            .and(path("/coins/markets"))
            .respond_with(ResponseTemplate::new(502))
            .expect(9)
            .mount(&the_server)
            .await;
        let the_dir = tempfile::tempdir()?;
        let the_fakes = Fakes::default();
        let the_supervisor = Supervisor::with_context(in_memory_context(
            test_config(&the_server.uri(), the_dir.path()),
            &the_fakes,
        )?);

        let the_err = the_supervisor.run_pipeline().await.expect_err("💀 the API is down");
        assert!(format!("{the_err:#}").contains("stage 'extract' after 3 attempt(s)"));

        let the_entries = the_supervisor.context.metadata_log.entries()?;
        assert_eq!(the_entries.len(), 3);
        assert!(the_entries.iter().all(|entry| entry.status.starts_with("FAILED: ") && entry.record_count == 0));
        assert!(the_fakes.store.keys(SILVER_BUCKET).await.is_empty());
        assert!(the_fakes.crawler.started().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_broken_crawler_uses_up_every_retry() -> Result<()> {
        let the_dir = tempfile::tempdir()?;
        let the_fakes = Fakes::default();
        let mut the_config = test_config("http://unused.test", the_dir.path());
        the_config.catalog.crawler_name = Some(String::new());
        let the_supervisor = Supervisor::with_context(in_memory_context(the_config, &the_fakes)?);

        // 🕷️ an empty crawler name is rejected by the fake on every attempt
        let the_err = the_supervisor.run_stage(StageKind::Crawl).await.expect_err("💀 bad name");
        assert!(format!("{the_err:#}").contains("Stage 'crawl' failed"));
        let the_err = the_supervisor
            .run_stage_with_retries(StageKind::Crawl)
            .await
            .expect_err("💀 still a bad name");
        assert!(format!("{the_err:#}").contains("after 3 attempt(s)"));
        Ok(())
    }
}
