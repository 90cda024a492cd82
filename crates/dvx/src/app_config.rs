//! 🔧 App Configuration — the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." — every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment. Three layers, later wins:
//!   1. the plain env names the scheduled deployment already exports
//!      (`AWS_REGION`, `AWS_S3_BRONZE_BUCKET`, `AWS_S3_SILVER_BUCKET`, `GLUE_CRAWLER_NAME`)
//!   2. `DVX_*` env vars, `__` for nesting (`DVX_STORAGE__BRONZE_BUCKET`)
//!   3. the TOML file, if one was given

use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

use crate::backends::s3::default_region;
use crate::backends::{CatalogConfig, CoinGeckoSourceConfig, QueryConfig, StorageConfig};
use crate::metadata_log::MetadataConfig;

/// 🗺️ Plain env names → dotted config paths. These predate the `DVX_` prefix.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("AWS_REGION", "storage.region"),
    ("AWS_S3_BRONZE_BUCKET", "storage.bronze_bucket"),
    ("AWS_S3_SILVER_BUCKET", "storage.silver_bucket"),
    ("GLUE_CRAWLER_NAME", "catalog.crawler_name"),
];

/// 📦 Everything the pipeline needs to know about itself.
///
/// Only `storage` is mandatory (the bucket names). Every other section has
/// defaults that match the scheduled six-hourly run.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub market_api: CoinGeckoSourceConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// ⚙️ Step-level retry policy for `dvx run`. The per-call retries (fetch, upload)
/// live inside the stages; this is the outer loop the scheduler used to own.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// 🔄 extra attempts per stage after the first failure
    #[serde(default = "default_step_retries")]
    pub step_retries: u32,
    /// ⏳ fixed pause between stage attempts
    #[serde(default = "default_step_retry_delay_secs")]
    pub step_retry_delay_secs: u64,
}

fn default_step_retries() -> u32 {
    2
}

fn default_step_retry_delay_secs() -> u64 {
    180
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            step_retries: default_step_retries(),
            step_retry_delay_secs: default_step_retry_delay_secs(),
        }
    }
}

/// 🧰 The slice of config that `inspect` and `sanity-check` read. No buckets required:
/// checking credentials should not depend on knowing where the data goes.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ToolConfig {
    #[serde(default)]
    pub storage: RegionConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
}

/// 🌎 Just the region out of `[storage]`. The bucket names, if present, are ignored.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RegionConfig {
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
        }
    }
}

/// 🏚️ The base layer: the unprefixed env names, renamed to where they live now.
fn legacy_env() -> Env {
    Env::raw().filter_map(|key| {
        LEGACY_ENV_KEYS
            .iter()
            .find(|(legacy, _)| key == *legacy)
            .map(|(_, dotted)| (*dotted).into())
    })
}

/// 🥞 Every layer, stacked. Later merges win.
fn layered(config_file_name: Option<&Path>) -> Figment {
    let config = Figment::new()
        .merge(legacy_env())
        .merge(Env::prefixed("DVX_").split("__"));

    match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    }
}

fn context_msg(config_file_name: Option<&Path>) -> String {
    match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (DVX_*, AWS_S3_*_BUCKET, AWS_REGION, GLUE_CRAWLER_NAME). \
             The file exists in our hearts, but apparently not in the shape we need.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (DVX_*, AWS_S3_*_BUCKET, AWS_REGION, GLUE_CRAWLER_NAME). \
                 No file was provided — this one's all on the environment. Classic."
            .to_string(),
    }
}

/// 🚀 Load the config — from env vars, and a TOML file if one was given.
///
/// 📐 `config_file_name` None → env vars only. Some → env vars + TOML, TOML wins on conflicts.
///
/// 💀 Errors name the layers that were consulted, so "missing field `bronze_bucket`"
/// comes with a hint about where it could have come from.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );
    layered(config_file_name)
        .extract()
        .with_context(|| context_msg(config_file_name))
}

/// 🧰 Same layers as `load_config`, read into `ToolConfig`. Works with no buckets configured.
pub fn load_tool_config(config_file_name: Option<&Path>) -> anyhow::Result<ToolConfig> {
    layered(config_file_name)
        .extract()
        .with_context(|| context_msg(config_file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn the_one_where_a_minimal_file_gets_every_default() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "dvx.toml",
                r#"
                [storage]
                bronze_bucket = "raw-coins"
                silver_bucket = "clean-coins"
                "#,
            )?;

            let app_config = load_config(Some(Path::new("dvx.toml"))).map_err(|e| format!("{e:#}"))?;

            assert_eq!(app_config.market_api, CoinGeckoSourceConfig::default());
            assert_eq!(app_config.market_api.per_page, 10);
            assert_eq!(app_config.market_api.retry.max_attempts, 3);
            assert_eq!(app_config.storage.bronze_bucket, "raw-coins");
            assert_eq!(app_config.storage.upload_retry.max_attempts, 3);
            assert_eq!(app_config.metadata.db_path, Path::new("metadata.db"));
            assert_eq!(app_config.catalog, CatalogConfig::default());
            assert_eq!(app_config.query.workgroup, "primary");
            assert_eq!(app_config.runtime, RuntimeConfig::default());
            assert_eq!(app_config.runtime.step_retry_delay_secs, 180);
            Ok(())
        });
    }

    #[test]
    fn the_one_where_the_old_env_names_still_answer_the_phone() {
        Jail::expect_with(|jail| {
            jail.set_env("AWS_REGION", "eu-west-1");
            jail.set_env("AWS_S3_BRONZE_BUCKET", "legacy-bronze");
            jail.set_env("AWS_S3_SILVER_BUCKET", "legacy-silver");
            jail.set_env("GLUE_CRAWLER_NAME", "crypto_silver_crawler");

            let app_config = load_config(None).map_err(|e| format!("{e:#}"))?;

            assert_eq!(app_config.storage.region, "eu-west-1");
            assert_eq!(app_config.storage.bronze_bucket, "legacy-bronze");
            assert_eq!(app_config.storage.silver_bucket, "legacy-silver");
            assert_eq!(app_config.catalog.crawler_name.as_deref(), Some("crypto_silver_crawler"));
            Ok(())
        });
    }

    #[test]
    fn the_one_where_prefixed_env_beats_legacy_and_the_file_beats_both() {
        Jail::expect_with(|jail| {
            jail.set_env("AWS_S3_BRONZE_BUCKET", "legacy-bronze");
            jail.set_env("AWS_S3_SILVER_BUCKET", "legacy-silver");
            jail.set_env("DVX_STORAGE__BRONZE_BUCKET", "prefixed-bronze");
            jail.set_env("DVX_RUNTIME__STEP_RETRIES", "5");
            jail.create_file(
                "dvx.toml",
                r#"
                [storage]
                silver_bucket = "file-silver"

                [market_api]
                per_page = 25
                "#,
            )?;

            let app_config = load_config(Some(Path::new("dvx.toml"))).map_err(|e| format!("{e:#}"))?;

            assert_eq!(app_config.storage.bronze_bucket, "prefixed-bronze");
            assert_eq!(app_config.storage.silver_bucket, "file-silver");
            assert_eq!(app_config.runtime.step_retries, 5);
            assert_eq!(app_config.market_api.per_page, 25);
            Ok(())
        });
    }

    #[test]
    fn the_one_where_the_tools_need_no_buckets() {
        Jail::expect_with(|jail| {
            jail.set_env("AWS_REGION", "ap-southeast-2");
            jail.set_env("DVX_METADATA__DB_PATH", "audit/metadata.db");

            let the_tool_config = load_tool_config(None).map_err(|e| format!("{e:#}"))?;

            assert_eq!(the_tool_config.storage.region, "ap-southeast-2");
            assert_eq!(the_tool_config.metadata.db_path, Path::new("audit/metadata.db"));
            Ok(())
        });
    }

    #[test]
    fn the_one_where_an_empty_environment_still_has_a_region() {
        Jail::expect_with(|_jail| {
            let the_tool_config = load_tool_config(None).map_err(|e| format!("{e:#}"))?;
            assert_eq!(the_tool_config.storage, RegionConfig::default());
            assert_eq!(the_tool_config.storage.region, "us-east-1");
            assert_eq!(the_tool_config.metadata.db_path, Path::new("metadata.db"));
            Ok(())
        });
    }

    #[test]
    fn the_one_where_no_buckets_means_no_pipeline() {
        Jail::expect_with(|_jail| {
            let the_err = load_config(None).expect_err("💀 buckets are not optional");
            assert!(format!("{the_err:#}").contains("DVX_"));
            Ok(())
        });
    }
}
