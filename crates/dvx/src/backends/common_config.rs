// ai
//! ☁️ **Common AWS plumbing** — the shared DNA of every AWS-backed backend.
//!
//! 🧠 Knowledge graph:
//! - `load_sdk_config`: one `SdkConfig` per command, handed to S3, Glue, Athena and STS clients
//! - Credentials: env vars → ~/.aws/config profile → IAM role → hope. In that order.
//!   `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` just work, nobody has to plumb them.
//! - Region: always explicit, from `storage.region`. Never the SDK's guess.
//!
//! "He who lets the SDK pick the region, debugs us-east-1 from eu-west-1." — Ancient proverb 📜

use aws_config::{Region, SdkConfig};
use tracing::debug;

/// 🔧 Build the shared AWS config for `region`, credentials from the default provider chain.
pub(crate) async fn load_sdk_config(region: &str) -> SdkConfig {
    debug!("☁️ loading AWS config for region {}", region);
    aws_config::from_env()
        .region(Region::new(region.to_string()))
        .load()
        .await
}
