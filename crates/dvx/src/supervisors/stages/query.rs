// ai
//! 📊 Query — run the configured SQL over the freshly crawled table and show the answer.
//!
//! Submit → poll every `query.poll_interval_secs` → on SUCCEEDED fetch the first
//! page of results and print it; on FAILED or CANCELLED fail with the engine's reason;
//! give up after `query.max_wait_secs`.

use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{Stage, StageContext};
use crate::backends::{QueryEngine, QueryStatus};
use crate::preview;

#[derive(Debug, Clone, Copy)]
pub(crate) struct QueryStage;

#[async_trait]
impl Stage for QueryStage {
    fn name(&self) -> &'static str {
        "query"
    }

    async fn run(&self, context: &StageContext) -> Result<()> {
        let query = &context.config.query;
        let the_request = query.to_request()?;
        info!("🔎 Running query on {}: {}", the_request.database, the_request.sql);
        let the_execution_id = context.query_engine.start_query(&the_request).await?;

        let the_poll_interval = Duration::from_secs(query.poll_interval_secs);
        let the_deadline = Instant::now() + Duration::from_secs(query.max_wait_secs);
        loop {
            match context.query_engine.query_status(&the_execution_id).await? {
                QueryStatus::Succeeded => {
                    let the_results = context.query_engine.query_results(&the_execution_id).await?;
                    info!("✅ Query {} returned {} rows", the_execution_id, the_results.rows.len());
                    println!("{}", preview::query_results(&the_results));
                    return Ok(());
                }
                QueryStatus::Failed(reason) => bail!("💀 Query {} failed: {}", the_execution_id, reason),
                QueryStatus::Cancelled(reason) => bail!("💀 Query {} was cancelled: {}", the_execution_id, reason),
                the_pending @ (QueryStatus::Queued | QueryStatus::Running) => {
                    if Instant::now() >= the_deadline {
                        bail!(
                            "💀 Query {} still {:?} after {}s",
                            the_execution_id,
                            the_pending,
                            query.max_wait_secs
                        );
                    }
                    debug!("⏳ Query {} is {:?}", the_execution_id, the_pending);
                    tokio::time::sleep(the_poll_interval).await;
                }
            }
        }
    }
}
