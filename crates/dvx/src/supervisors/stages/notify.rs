// ai
//! 📣 Notify — the curtain call. One log line, no side effects.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::{Stage, StageContext};
use crate::common::format_timestamp;

#[derive(Debug, Clone, Copy)]
pub(crate) struct NotifyStage;

/// 📝 `CoinGecko ETL pipeline finished at 2026-10-17 06:00:12 UTC`
pub(crate) fn completion_message(finished_at: chrono::DateTime<Utc>) -> String {
    format!("CoinGecko ETL pipeline finished at {} UTC", format_timestamp(finished_at))
}

#[async_trait]
impl Stage for NotifyStage {
    fn name(&self) -> &'static str {
        "notify"
    }

    async fn run(&self, _context: &StageContext) -> Result<()> {
        info!("✅ {}", completion_message(Utc::now()));
        Ok(())
    }
}
