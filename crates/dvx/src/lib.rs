//! 🪙 dvx — the dataverse market-insights ETL.
//!
//! CoinGecko → 🥉 bronze CSV → S3 → 🥈 silver CSV → S3 → Glue crawler → Athena → 📣.
//! Every extract and transform leaves one row in a local SQLite audit log.
//!
//! The binary crate parses arguments and sets up logging; everything else lives here.

pub mod app_config;
pub mod common;
pub mod transforms;

pub(crate) mod backends;
pub(crate) mod metadata_log;
pub(crate) mod partitions;
pub(crate) mod preview;
pub(crate) mod retry;
pub(crate) mod supervisors;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app_config::{load_config, load_tool_config};
use crate::backends::common_config::load_sdk_config;
use crate::metadata_log::MetadataLog;
use crate::supervisors::Supervisor;

pub use crate::backends::{CatalogConfig, CoinGeckoSourceConfig, FetchError, QueryConfig, StorageConfig};
pub use crate::metadata_log::MetadataConfig;
pub use crate::retry::RetryPolicy;
pub use crate::supervisors::StageKind;

/// 🎛️ What the CLI asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 🎯 one stage, one attempt
    Stage(StageKind),
    /// 🎬 every stage in order, with step retries
    Run,
    /// 🪵 print the metadata log
    Inspect,
    /// ☁️ print the AWS caller identity
    SanityCheck,
}

/// 🚀 Do the thing the CLI asked for.
///
/// Pipeline commands load the full `AppConfig` (buckets required). `inspect` and
/// `sanity-check` only load `ToolConfig`, so they work before any bucket exists.
pub async fn run(config_file_name: Option<&Path>, command: Command) -> Result<()> {
    match command {
        Command::Stage(stage) => {
            let app_config = load_config(config_file_name)?;
            Supervisor::connect(app_config).await?.run_stage(stage).await
        }
        Command::Run => {
            let app_config = load_config(config_file_name)?;
            Supervisor::connect(app_config).await?.run_pipeline().await
        }
        Command::Inspect => {
            let tool_config = load_tool_config(config_file_name)?;
            inspect(&MetadataLog::new(tool_config.metadata.db_path))
        }
        Command::SanityCheck => {
            let tool_config = load_tool_config(config_file_name)?;
            sanity_check(&tool_config.storage.region).await
        }
    }
}

/// 🪵 Tables in the metadata database, then every extraction log row.
/// A missing `extraction_logs` table is a warning, not an error: nothing has run yet.
fn inspect(metadata_log: &MetadataLog) -> Result<()> {
    let the_tables = metadata_log.tables()?;
    println!("📂 Tables in {}:", metadata_log.path().display());
    println!("{}", preview::name_list("name", &the_tables));

    match metadata_log.entries() {
        Ok(the_entries) => {
            println!("🪵 Extraction Logs:");
            println!("{}", preview::log_entries(&the_entries));
        }
        Err(err) => warn!("⚠️ Couldn't read 'extraction_logs' table: {:#}", err),
    }
    Ok(())
}

/// ☁️ Ask STS who we are. Proves credentials and region before a real run.
async fn sanity_check(region: &str) -> Result<()> {
    let the_sdk_config = load_sdk_config(region).await;
    let the_identity = aws_sdk_sts::Client::new(&the_sdk_config)
        .get_caller_identity()
        .send()
        .await
        .context("💀 STS GetCallerIdentity failed. Check AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY, the profile, and the region.")?;
    info!("✅ AWS credentials are valid");
    println!(
        "Caller identity: account={} arn={} user_id={}",
        the_identity.account().unwrap_or("?"),
        the_identity.arn().unwrap_or("?"),
        the_identity.user_id().unwrap_or("?")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_inspect_on_a_fresh_db_is_not_a_crime() -> Result<()> {
        let the_dir = tempfile::tempdir()?;
        let the_log = MetadataLog::new(the_dir.path().join("metadata.db"));
        // 📭 no table yet: inspect still succeeds
        inspect(&the_log)?;

        the_log.init()?;
        the_log.append("CoinGecko", 10, "SUCCESS", Some("bronze/crypto/x.csv"), 1.23)?;
        inspect(&the_log)?;
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_inspect_runs_without_any_buckets() -> Result<()> {
        let the_dir = tempfile::tempdir()?;
        let the_db_path = the_dir.path().join("metadata.db");
        let the_config_path = the_dir.path().join("dvx.toml");
        // 🪣 no [storage] section at all
        std::fs::write(
            &the_config_path,
            format!("[metadata]\ndb_path = {:?}\n", the_db_path.to_string_lossy()),
        )?;

        run(Some(&the_config_path), Command::Inspect).await?;
        Ok(())
    }
}
