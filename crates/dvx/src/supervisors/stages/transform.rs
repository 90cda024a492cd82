// ai
//! 🥈 Transform — newest bronze file in, one silver file out.
//!
//! List `bronze/crypto/` → pick the newest CSV by filename timestamp → download →
//! dedupe, drop null price/cap, add ratio and tier → PUT to the silver bucket →
//! log `s3://bucket/key`. Bronze is never touched again, success or failure.

use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use super::{Stage, StageContext, record_failure, runtime_seconds};
use crate::backends::ObjectStore;
use crate::common::BronzeRecord;
use crate::partitions::{Layer, latest_bronze_key, partition_key, silver_file_name};
use crate::transforms::csv_codec::{decode_csv, encode_csv};
use crate::transforms::{BatchTransform, SilverRefinery};

/// 🏷️ `source_api` value for transform rows in the metadata log
pub(crate) const TRANSFORM_SOURCE_API: &str = "coingecko_silver";

#[derive(Debug, Clone, Copy)]
pub(crate) struct TransformStage;

async fn refine_latest(context: &StageContext) -> Result<(usize, String)> {
    let storage = &context.config.storage;
    let the_keys = context
        .object_store
        .list_keys(&storage.bronze_bucket, &Layer::Bronze.dataset_prefix())
        .await?;
    let the_latest_key = latest_bronze_key(&the_keys)?;
    info!("📥 Processing latest Bronze file: {}", the_latest_key);

    let the_bytes = context
        .object_store
        .get_object(&storage.bronze_bucket, &the_latest_key)
        .await?;
    let the_bronze: Vec<BronzeRecord> = decode_csv(&the_bytes)?;
    let the_bronze_count = the_bronze.len();

    let the_now = Utc::now();
    let the_silver = SilverRefinery::transform_batch(the_bronze, the_now);
    info!(
        "🧹 {} bronze rows → {} silver rows",
        the_bronze_count,
        the_silver.len()
    );

    let the_key = partition_key(Layer::Silver, the_now.date_naive(), &silver_file_name(the_now));
    context
        .upload_with_retry(&storage.silver_bucket, &the_key, encode_csv(&the_silver)?, storage.encrypt_silver)
        .await?;
    let the_uri = format!("s3://{}/{}", storage.silver_bucket, the_key);
    info!("✅ Uploaded cleaned data to {}", the_uri);
    Ok((the_silver.len(), the_uri))
}

#[async_trait]
impl Stage for TransformStage {
    fn name(&self) -> &'static str {
        "transform"
    }

    async fn run(&self, context: &StageContext) -> Result<()> {
        context.metadata_log.init()?;
        let the_start = Instant::now();

        match refine_latest(context).await {
            Ok((the_count, the_uri)) => {
                let the_runtime = runtime_seconds(the_start);
                context
                    .metadata_log
                    .append(TRANSFORM_SOURCE_API, the_count as i64, "SUCCESS", Some(&the_uri), the_runtime)?;
                info!("✅ Transformation complete — {} records in {:.2}s", the_count, the_runtime);
                Ok(())
            }
            Err(err) => {
                error!("❌ Transformation failed: {:#}", err);
                Err(record_failure(context, TRANSFORM_SOURCE_API, err, the_start))
            }
        }
    }
}
