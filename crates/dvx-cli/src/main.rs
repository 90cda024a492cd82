//! 🚀 dvx-cli — the front door, the bouncer, the maitre d' of dvx.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary crate is the thin CLI wrapper that parses arguments, loads config,
//! sets up logging, and then lets the library do the heavy lifting.
//! Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dvx::{Command, StageKind};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// 🪙 CoinGecko → S3 bronze/silver → Glue → Athena, one subcommand per step.
#[derive(Debug, Parser)]
#[command(name = "dvx", version, about)]
struct Cli {
    /// 🔧 TOML config file. Defaults to `dvx.toml` when that file exists; env vars only otherwise.
    #[arg(long, short, env = "DVX_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// 🥉 Fetch market data, write bronze locally and to S3, log the run
    Extract,
    /// 🥈 Refine the newest bronze file into silver, log the run
    Transform,
    /// 🕷️ Start the catalog crawler and wait for it to finish
    Crawl,
    /// 🔎 Run the configured SQL and print the results
    Query,
    /// 📣 Log the completion notice
    Notify,
    /// 🎬 Every stage in order, with step retries
    Run,
    /// 🪵 Print the metadata log
    Inspect,
    /// ☁️ Print the AWS caller identity
    SanityCheck,
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::Extract => Command::Stage(StageKind::Extract),
            CliCommand::Transform => Command::Stage(StageKind::Transform),
            CliCommand::Crawl => Command::Stage(StageKind::Crawl),
            CliCommand::Query => Command::Stage(StageKind::Query),
            CliCommand::Notify => Command::Stage(StageKind::Notify),
            CliCommand::Run => Command::Run,
            CliCommand::Inspect => Command::Inspect,
            CliCommand::SanityCheck => Command::SanityCheck,
        }
    }
}

/// 🔍 An explicit `--config` must exist. The implicit `dvx.toml` is optional.
fn resolve_config_path(explicit: Option<PathBuf>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            let exists = path.try_exists().with_context(|| {
                format!(
                    "💀 Couldn't check whether the config file exists. Was checking here: '{}'",
                    path.display()
                )
            })?;
            anyhow::ensure!(
                exists,
                "💀 Configuration file '{}' does not exist. Double check the path, or pwd/cwd if it's relative.",
                path.display()
            );
            Ok(Some(path))
        }
        None => {
            let the_default = PathBuf::from("dvx.toml");
            Ok(the_default.is_file().then_some(the_default))
        }
    }
}

/// 🕵️ Does this error chain smell like a network problem?
fn looks_like_connection_trouble(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        let cause_str = cause.to_string();
        cause_str.contains("error sending request")
            || cause_str.contains("connection refused")
            || cause_str.contains("Connection refused")
            || cause_str.contains("tcp connect error")
            || cause_str.contains("dns error")
            || cause_str.contains("dispatch failure")
            || cause_str.contains("timed out")
    })
}

async fn run(cli: Cli) -> Result<()> {
    let the_config_path = resolve_config_path(cli.config)?;
    dvx::run(the_config_path.as_deref(), cli.command.into()).await
}

/// 🚀 main() — where it all begins.
///
/// 1. Init tracing (`RUST_LOG`, default `info`)
/// 2. Parse args
/// 3. Load config and run the command
/// 4. On error: print the whole chain, maybe a hint, exit 1
#[tokio::main]
async fn main() {
    let the_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(the_filter).init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error!("💀 error: {}", err);
        // -- 🧅 peel the onion, one layer at a time
        for cause in err.chain().skip(1) {
            error!("⚠️  cause: {}", cause);
        }

        if looks_like_connection_trouble(&err) {
            error!(
                "🔧 hint: looks like a service isn't reachable. \
                Check your network, the market API base_url, the AWS region, \
                and whether a proxy or VPN is in the way. \
                `dvx sanity-check` tells you whether AWS can be reached at all. ☕"
            );
        }

        std::process::exit(1);
    }
}
