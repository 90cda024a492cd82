// ai
//! 🪣📤📥 S3 Object Store — put, list, get. The whole vocabulary.
//!
//! 🧠 Knowledge graph:
//! - `StorageConfig`: region, the two buckets, per-layer encryption, local bronze dir, upload retry
//! - `S3ObjectStore`: one `aws_sdk_s3::Client`, built from the shared `SdkConfig`
//! - `put_object`: `ByteStream::from(Vec<u8>)`, SSE `AES256` when asked
//! - `list_keys`: `ListObjectsV2` with a continuation-token loop, so the 1001st key is not lost
//! - `get_object`: body collected into memory. Bronze files are ten rows. We'll live.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::backends::ObjectStore;
use crate::retry::RetryPolicy;

// ============================================================
//  🔧 StorageConfig — where the bytes go
// ============================================================

/// 🔧 The `[storage]` section. Bucket names have no defaults: an ETL that
/// guesses bucket names is an ETL that uploads into someone else's account.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// 🌎 defaults to us-east-1, like everything else in AWS
    #[serde(default = "default_region")]
    pub region: String,
    pub bronze_bucket: String,
    pub silver_bucket: String,
    /// 🔒 SSE-AES256 on bronze uploads
    #[serde(default = "default_true")]
    pub encrypt_bronze: bool,
    #[serde(default)]
    pub encrypt_silver: bool,
    /// 📂 local copy of every bronze file, written before upload
    #[serde(default = "default_local_bronze_dir")]
    pub local_bronze_dir: String,
    #[serde(default)]
    pub upload_retry: RetryPolicy,
}

pub(crate) fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_local_bronze_dir() -> String {
    "data/bronze".to_string()
}

impl StorageConfig {
    /// 🧪 A config with the given buckets and every default filled in.
    pub fn with_buckets(bronze_bucket: impl Into<String>, silver_bucket: impl Into<String>) -> Self {
        Self {
            region: default_region(),
            bronze_bucket: bronze_bucket.into(),
            silver_bucket: silver_bucket.into(),
            encrypt_bronze: true,
            encrypt_silver: false,
            local_bronze_dir: default_local_bronze_dir(),
            upload_retry: RetryPolicy::default(),
        }
    }
}

// ============================================================
//  🪣 S3ObjectStore
// ============================================================

#[derive(Debug)]
pub(crate) struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub(crate) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>, encrypt: bool) -> Result<()> {
        trace!("📤 PUT s3://{}/{} ({} bytes, encrypt={})", bucket, key, body.len(), encrypt);
        let mut the_request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));
        if encrypt {
            the_request = the_request.server_side_encryption(ServerSideEncryption::Aes256);
        }
        the_request.send().await.with_context(|| {
            format!(
                "💀 PUT s3://{}/{} failed. Check: bucket name, region, IAM permissions, and whether the bucket exists at all.",
                bucket, key
            )
        })?;
        Ok(())
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut the_keys = Vec::new();
        let mut the_continuation_token: Option<String> = None;
        loop {
            let the_page = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(the_continuation_token.take())
                .send()
                .await
                .with_context(|| format!("💀 LIST s3://{}/{} failed. The bucket is not talking to us.", bucket, prefix))?;

            the_keys.extend(the_page.contents().iter().filter_map(|object| object.key().map(str::to_string)));

            match (the_page.is_truncated(), the_page.next_continuation_token()) {
                (Some(true), Some(token)) => the_continuation_token = Some(token.to_string()),
                _ => break,
            }
        }
        debug!("📋 s3://{}/{} → {} keys", bucket, prefix, the_keys.len());
        Ok(the_keys)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let the_response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("💀 GET s3://{}/{} failed. It was listed a moment ago. Rude.", bucket, key))?;
        let the_bytes = the_response
            .body
            .collect()
            .await
            .with_context(|| format!("💀 The body of s3://{}/{} stopped streaming halfway", bucket, key))?;
        Ok(the_bytes.into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_only_the_buckets_are_required() {
        let the_config: StorageConfig = serde_json::from_value(serde_json::json!({
            "bronze_bucket": "raw-coins",
            "silver_bucket": "clean-coins"
        }))
        .expect("💀 two buckets should be enough");
        assert_eq!(the_config, StorageConfig::with_buckets("raw-coins", "clean-coins"));
        assert!(the_config.encrypt_bronze);
        assert!(!the_config.encrypt_silver);
        assert_eq!(the_config.region, "us-east-1");
        assert_eq!(the_config.local_bronze_dir, "data/bronze");
    }

    #[test]
    fn the_one_where_a_missing_bucket_is_a_config_error() {
        let the_result = serde_json::from_value::<StorageConfig>(serde_json::json!({ "bronze_bucket": "raw-coins" }));
        assert!(the_result.is_err());
    }
}
