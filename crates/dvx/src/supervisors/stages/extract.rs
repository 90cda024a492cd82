// ai
//! 🥉 Extract — ask the market API, write bronze, upload it, write it down.
//!
//! 🎬 INT. SIX O'CLOCK — THE SCHEDULER CLEARS ITS THROAT.
//!
//! Fetch (with retry) → stamp every row with one ingestion time → CSV on local disk
//! → PUT to the bronze bucket under `bronze/crypto/ingest_date=…/` → one row in the
//! metadata log. If anything in that chain fails, the log still gets exactly one row,
//! status `FAILED: …`, zero records, no path. Then the error goes up and the step fails.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};

use super::{Stage, StageContext, record_failure, runtime_seconds};
use crate::common::BronzeRecord;
use crate::partitions::{Layer, bronze_file_name, partition_key};
use crate::preview;
use crate::transforms::csv_codec::write_csv_file;
use crate::transforms::{BatchTransform, BronzeSnapshot};

/// 🏷️ `source_api` value for extract rows in the metadata log
pub(crate) const EXTRACT_SOURCE_API: &str = "CoinGecko";

#[derive(Debug, Clone, Copy)]
pub(crate) struct ExtractStage;

/// 📦 What a successful extract hands back for logging.
struct Extracted {
    records: Vec<BronzeRecord>,
    key: String,
}

async fn fetch_and_land(context: &StageContext) -> Result<Extracted> {
    info!("🚀 Starting CoinGecko extraction...");
    let the_markets = context
        .market_source
        .fetch_markets()
        .await
        .context("💀 Could not fetch market data")?;

    let the_now = Utc::now();
    let the_records = BronzeSnapshot::transform_batch(the_markets, the_now);
    if the_records.is_empty() {
        bail!("API returned no data!");
    }
    if the_records.iter().any(BronzeRecord::has_missing_values) {
        warn!("⚠️ Warning: Missing values detected in data!");
    }

    let storage = &context.config.storage;
    let the_file_name = bronze_file_name(the_now);
    let the_local_path = Path::new(&storage.local_bronze_dir).join(&the_file_name);
    write_csv_file(&the_local_path, &the_records).await?;
    info!("💾 Data saved locally to {}", the_local_path.display());

    // -- 📤 the bytes that go up are the bytes on disk
    let the_body = tokio::fs::read(&the_local_path)
        .await
        .with_context(|| format!("💀 Could not read back '{}'", the_local_path.display()))?;
    let the_key = partition_key(Layer::Bronze, the_now.date_naive(), &the_file_name);
    context
        .upload_with_retry(&storage.bronze_bucket, &the_key, the_body, storage.encrypt_bronze)
        .await?;
    info!("☁️ Uploaded to s3://{}/{}", storage.bronze_bucket, the_key);

    Ok(Extracted {
        records: the_records,
        key: the_key,
    })
}

#[async_trait]
impl Stage for ExtractStage {
    fn name(&self) -> &'static str {
        "extract"
    }

    async fn run(&self, context: &StageContext) -> Result<()> {
        context.metadata_log.init()?;
        let the_start = Instant::now();

        match fetch_and_land(context).await {
            Ok(extracted) => {
                let the_runtime = runtime_seconds(the_start);
                context.metadata_log.append(
                    EXTRACT_SOURCE_API,
                    extracted.records.len() as i64,
                    "SUCCESS",
                    Some(&extracted.key),
                    the_runtime,
                )?;
                info!(
                    "✅ Extraction successful — {} records in {:.2}s",
                    extracted.records.len(),
                    the_runtime
                );
                println!("{}", preview::bronze_preview(&extracted.records));
                Ok(())
            }
            Err(err) => {
                error!("❌ ETL failed: {:#}", err);
                Err(record_failure(context, EXTRACT_SOURCE_API, err, the_start))
            }
        }
    }
}
