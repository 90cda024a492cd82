// ai
//! 🪵🗄️ Metadata Log — one SQLite table that remembers every run.
//!
//! INT. LOCAL DISK — A FILE CALLED `metadata.db` — ALWAYS THERE.
//!
//! Every extract and every transform leaves exactly one row here, success or not.
//! Nobody updates a row. Nobody deletes a row. If the table grows forever, it grows
//! forever. That is an operational problem for a future cron job, not for this module.
//!
//! 🧠 Knowledge graph:
//! - `MetadataConfig`: just the db path
//! - `MetadataLog`: holds the path, opens a fresh `rusqlite::Connection` per call
//! - `init()`: `CREATE TABLE IF NOT EXISTS`, idempotent, safe to call every run
//! - `append()`: one INSERT, auto-commit, `run_timestamp` = now UTC
//! - `entries()` / `tables()`: read side, for `dvx inspect`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use serde::Deserialize;
use tracing::debug;

use crate::common::{ExtractionLogEntry, format_timestamp};

/// 🔧 The `[metadata]` section.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MetadataConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("metadata.db")
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

const CREATE_EXTRACTION_LOGS: &str = "CREATE TABLE IF NOT EXISTS extraction_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_timestamp TEXT,
    source_api TEXT,
    record_count INTEGER,
    status TEXT,
    s3_path TEXT,
    runtime_seconds REAL
)";

/// 🪵 Append-only run log backed by a SQLite file.
#[derive(Debug, Clone)]
pub(crate) struct MetadataLog {
    path: PathBuf,
}

impl MetadataLog {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path).with_context(|| {
            format!(
                "💀 Could not open the metadata database at '{}'. Is the directory writable?",
                self.path.display()
            )
        })
    }

    /// 🏗️ Create `extraction_logs` if it isn't there yet.
    pub(crate) fn init(&self) -> Result<()> {
        let the_conn = self.connect()?;
        the_conn
            .execute_batch(CREATE_EXTRACTION_LOGS)
            .context("💀 CREATE TABLE extraction_logs failed")?;
        debug!("🗄️ metadata log ready at {}", self.path.display());
        Ok(())
    }

    /// ✍️ Record one run outcome, stamped with the current UTC time.
    pub(crate) fn append(
        &self,
        source_api: &str,
        record_count: i64,
        status: &str,
        s3_path: Option<&str>,
        runtime_seconds: f64,
    ) -> Result<()> {
        let the_conn = self.connect()?;
        the_conn
            .execute(
                "INSERT INTO extraction_logs (run_timestamp, source_api, record_count, status, s3_path, runtime_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    format_timestamp(Utc::now()),
                    source_api,
                    record_count,
                    status,
                    s3_path,
                    runtime_seconds
                ],
            )
            .with_context(|| format!("💀 Could not append the '{}' run to extraction_logs", source_api))?;
        Ok(())
    }

    /// 📜 Every row, oldest first.
    pub(crate) fn entries(&self) -> Result<Vec<ExtractionLogEntry>> {
        let the_conn = self.connect()?;
        let mut the_statement = the_conn
            .prepare(
                "SELECT id, run_timestamp, source_api, record_count, status, s3_path, runtime_seconds
                 FROM extraction_logs ORDER BY id",
            )
            .context("💀 Could not read extraction_logs. Has anything run yet?")?;
        let the_rows = the_statement.query_map([], |row| {
            Ok(ExtractionLogEntry {
                id: row.get(0)?,
                run_timestamp: row.get(1)?,
                source_api: row.get(2)?,
                record_count: row.get(3)?,
                status: row.get(4)?,
                s3_path: row.get(5)?,
                runtime_seconds: row.get(6)?,
            })
        })?;
        let the_entries: rusqlite::Result<Vec<ExtractionLogEntry>> = the_rows.collect();
        the_entries.context("💀 A row in extraction_logs has the wrong shape")
    }

    /// 📋 Names of every table in the database.
    pub(crate) fn tables(&self) -> Result<Vec<String>> {
        let the_conn = self.connect()?;
        let mut the_statement = the_conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .context("💀 Could not list tables in the metadata database")?;
        let the_names: rusqlite::Result<Vec<String>> = the_statement.query_map([], |row| row.get(0))?.collect();
        the_names.context("💀 sqlite_master returned something that isn't a name")
    }
}
