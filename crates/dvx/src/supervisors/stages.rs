// ai
//! 🎬 Stages — the five acts of every run.
//!
//! ```text
//!   extract ──▶ transform ──▶ crawl ──▶ query ──▶ notify
//!   API→🥉       🥉→🥈          🥈→📚      📚→📊      📣
//! ```
//!
//! 🧠 Knowledge graph:
//! - `Stage`: one async `run` against a shared `StageContext`
//! - `StageKind`: the enum that dispatches to each stage, same trick as the backend enums
//! - `StageContext`: config + every backend the stages touch, built once per command
//! - `upload_with_retry`: the one place PUTs go through `storage.upload_retry`
//!
//! Stages hold no state between runs. Everything they know comes from the context,
//! the buckets, or the metadata log.

use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::error;

use crate::app_config::AppConfig;
use crate::backends::common_config::load_sdk_config;
use crate::backends::{
    AthenaQueryEngine, CoinGeckoSource, CrawlerBackend, GlueCrawler, ObjectStore, ObjectStoreBackend,
    QueryBackend, S3ObjectStore,
};
use crate::metadata_log::MetadataLog;
use crate::retry::retry_with_backoff;

mod crawl;
mod extract;
mod notify;
mod query;
mod transform;

pub(crate) use crawl::CrawlStage;
pub(crate) use extract::ExtractStage;
pub(crate) use notify::NotifyStage;
pub(crate) use query::QueryStage;
pub(crate) use transform::TransformStage;

/// 🧰 Everything a stage may touch. Built once, borrowed by every stage.
#[derive(Debug)]
pub(crate) struct StageContext {
    pub config: AppConfig,
    pub market_source: CoinGeckoSource,
    pub object_store: ObjectStoreBackend,
    pub crawler: CrawlerBackend,
    pub query_engine: QueryBackend,
    pub metadata_log: MetadataLog,
}

impl StageContext {
    /// ☁️ Wire up the real backends: CoinGecko over HTTP, S3, Glue, Athena.
    /// Nothing talks to AWS until a stage actually makes a call.
    pub(crate) async fn connect(config: AppConfig) -> Result<Self> {
        let the_sdk_config = load_sdk_config(&config.storage.region).await;
        Ok(Self {
            market_source: CoinGeckoSource::new(config.market_api.clone())?,
            object_store: ObjectStoreBackend::S3(S3ObjectStore::new(&the_sdk_config)),
            crawler: CrawlerBackend::Glue(GlueCrawler::new(&the_sdk_config)),
            query_engine: QueryBackend::Athena(AthenaQueryEngine::new(&the_sdk_config)),
            metadata_log: MetadataLog::new(config.metadata.db_path.clone()),
            config,
        })
    }

    /// 📤 PUT with the upload retry policy. Every error is worth another try here.
    pub(crate) async fn upload_with_retry(&self, bucket: &str, key: &str, body: Vec<u8>, encrypt: bool) -> Result<()> {
        let the_what = format!("upload to s3://{}/{}", bucket, key);
        retry_with_backoff(
            &self.config.storage.upload_retry,
            &the_what,
            |_: &anyhow::Error| true,
            |_attempt| self.object_store.put_object(bucket, key, body.clone(), encrypt),
        )
        .await
        .with_context(|| format!("💀 Gave up uploading s3://{}/{}", bucket, key))
    }
}

/// ⏱️ Seconds since `started`, rounded to two decimals, the way the log table stores them.
pub(crate) fn runtime_seconds(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

/// 🪦 Write the `FAILED: …` row for a stage that blew up, then hand back the stage's own error.
/// A log write that also fails is reported, but never replaces the error that caused it.
pub(crate) fn record_failure(context: &StageContext, source_api: &str, err: anyhow::Error, started: Instant) -> anyhow::Error {
    let the_runtime = runtime_seconds(started);
    if let Err(log_err) = context
        .metadata_log
        .append(source_api, 0, &format!("FAILED: {err:#}"), None, the_runtime)
    {
        error!("💀 Could not record the failure in the metadata log either: {:#}", log_err);
    }
    err
}

/// 🎭 One step of the pipeline.
#[async_trait]
pub(crate) trait Stage: std::fmt::Debug {
    fn name(&self) -> &'static str;
    async fn run(&self, context: &StageContext) -> Result<()>;
}

/// 🎬 The five stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Extract,
    Transform,
    Crawl,
    Query,
    Notify,
}

impl StageKind {
    /// 📜 The chain `dvx run` walks, first to last.
    pub const PIPELINE: [StageKind; 5] = [
        StageKind::Extract,
        StageKind::Transform,
        StageKind::Crawl,
        StageKind::Query,
        StageKind::Notify,
    ];
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[async_trait]
impl Stage for StageKind {
    fn name(&self) -> &'static str {
        match self {
            StageKind::Extract => ExtractStage.name(),
            StageKind::Transform => TransformStage.name(),
            StageKind::Crawl => CrawlStage.name(),
            StageKind::Query => QueryStage.name(),
            StageKind::Notify => NotifyStage.name(),
        }
    }

    async fn run(&self, context: &StageContext) -> Result<()> {
        match self {
            StageKind::Extract => ExtractStage.run(context).await,
            StageKind::Transform => TransformStage.run(context).await,
            StageKind::Crawl => CrawlStage.run(context).await,
            StageKind::Query => QueryStage.run(context).await,
            StageKind::Notify => NotifyStage.run(context).await,
        }
    }
}
