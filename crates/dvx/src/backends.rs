//! 🔌 Backends — where the real I/O happens.
//!
//! 📡 The market API pours the data, the object store keeps it, the crawler
//! catalogs it, and the query engine asks it questions. Everything outside this
//! process lives behind one of these doors.
//!
//! 🎭 This module is the casting agency. Need to store an object? S3 or RAM.
//! Need a crawler? Glue or a fake that says READY when you tell it to. Need SQL over
//! a bucket? Athena or a fake that already knows the answer. Same trait, same enum
//! dispatch, so the stages never learn which one they got.
//!
//! 🦆 The duck is here because every file must have one. This is law. Do not question the duck.

use anyhow::Result;
use async_trait::async_trait;

pub(crate) mod athena;
pub(crate) mod coingecko;
pub(crate) mod common_config;
pub(crate) mod glue;
#[cfg(test)]
pub(crate) mod in_mem;
pub(crate) mod s3;

// 🎯 Re-export the things callers actually touch, so nobody types `backends::coingecko::coingecko_source::` twice.
pub use athena::QueryConfig;
pub use coingecko::{CoinGeckoSource, CoinGeckoSourceConfig, FetchError};
pub use glue::CatalogConfig;
pub use s3::StorageConfig;
pub(crate) use athena::AthenaQueryEngine;
pub(crate) use glue::GlueCrawler;
#[cfg(test)]
pub(crate) use in_mem::{InMemoryCrawler, InMemoryObjectStore, InMemoryQueryEngine};
pub(crate) use s3::S3ObjectStore;

// ===== Object Store Trait and Backend Enum =====

/// 🪣 A place to put bytes under a key, and get them back later.
///
/// # Contract
/// - `put_object` overwrites. Keys are never reused in practice (they carry a timestamp),
///   but nothing here enforces that.
/// - `list_keys` returns EVERY key under the prefix, not just the first page.
/// - `encrypt` asks for server-side encryption at rest (AES256). Stores that can't honor
///   it are free to record the wish and move on.
#[async_trait]
pub(crate) trait ObjectStore: std::fmt::Debug {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>, encrypt: bool) -> Result<()>;
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// 🎭 The many faces of an object store. A universal remote with two buttons.
#[derive(Debug)]
pub(crate) enum ObjectStoreBackend {
    S3(S3ObjectStore),
    #[cfg(test)]
    InMemory(InMemoryObjectStore),
}

#[async_trait]
impl ObjectStore for ObjectStoreBackend {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>, encrypt: bool) -> Result<()> {
        match self {
            ObjectStoreBackend::S3(s3) => s3.put_object(bucket, key, body, encrypt).await,
            #[cfg(test)]
            ObjectStoreBackend::InMemory(mem) => mem.put_object(bucket, key, body, encrypt).await,
        }
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        match self {
            ObjectStoreBackend::S3(s3) => s3.list_keys(bucket, prefix).await,
            #[cfg(test)]
            ObjectStoreBackend::InMemory(mem) => mem.list_keys(bucket, prefix).await,
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        match self {
            ObjectStoreBackend::S3(s3) => s3.get_object(bucket, key).await,
            #[cfg(test)]
            ObjectStoreBackend::InMemory(mem) => mem.get_object(bucket, key).await,
        }
    }
}

// ===== Crawler Trait and Backend Enum =====

/// 🕷️ What a crawler is doing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CrawlerState {
    Ready,
    Running,
    Stopping,
    Other(String),
}

impl CrawlerState {
    pub(crate) fn from_wire(state: &str) -> Self {
        match state {
            "READY" => Self::Ready,
            "RUNNING" => Self::Running,
            "STOPPING" => Self::Stopping,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for CrawlerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => f.write_str("READY"),
            Self::Running => f.write_str("RUNNING"),
            Self::Stopping => f.write_str("STOPPING"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// 📸 One look at the crawler: its state, and whether the last crawl blew up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CrawlerSnapshot {
    pub state: CrawlerState,
    pub last_crawl_failure: Option<String>,
}

/// 🕷️ A catalog crawler that turns a pile of objects into a table definition.
#[async_trait]
pub(crate) trait Crawler: std::fmt::Debug {
    async fn start_crawler(&self, name: &str) -> Result<()>;
    async fn crawler_snapshot(&self, name: &str) -> Result<CrawlerSnapshot>;
}

#[derive(Debug)]
pub(crate) enum CrawlerBackend {
    Glue(GlueCrawler),
    #[cfg(test)]
    InMemory(InMemoryCrawler),
}

#[async_trait]
impl Crawler for CrawlerBackend {
    async fn start_crawler(&self, name: &str) -> Result<()> {
        match self {
            CrawlerBackend::Glue(glue) => glue.start_crawler(name).await,
            #[cfg(test)]
            CrawlerBackend::InMemory(mem) => mem.start_crawler(name).await,
        }
    }

    async fn crawler_snapshot(&self, name: &str) -> Result<CrawlerSnapshot> {
        match self {
            CrawlerBackend::Glue(glue) => glue.crawler_snapshot(name).await,
            #[cfg(test)]
            CrawlerBackend::InMemory(mem) => mem.crawler_snapshot(name).await,
        }
    }
}

// ===== Query Engine Trait and Backend Enum =====

/// 📝 Everything a SQL-over-object-storage engine needs to run one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryRequest {
    pub sql: String,
    pub database: String,
    pub output_location: String,
    pub workgroup: String,
}

/// 🚦 Where a submitted query is in its life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryStatus {
    Queued,
    Running,
    Succeeded,
    Failed(String),
    Cancelled(String),
}

/// 📊 A result set: a header and some rows, all strings, exactly as the engine returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QueryResults {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[async_trait]
pub(crate) trait QueryEngine: std::fmt::Debug {
    /// 🚀 Submit the query. Returns the engine's execution id.
    async fn start_query(&self, request: &QueryRequest) -> Result<String>;
    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus>;
    async fn query_results(&self, execution_id: &str) -> Result<QueryResults>;
}

#[derive(Debug)]
pub(crate) enum QueryBackend {
    Athena(AthenaQueryEngine),
    #[cfg(test)]
    InMemory(InMemoryQueryEngine),
}

#[async_trait]
impl QueryEngine for QueryBackend {
    async fn start_query(&self, request: &QueryRequest) -> Result<String> {
        match self {
            QueryBackend::Athena(athena) => athena.start_query(request).await,
            #[cfg(test)]
            QueryBackend::InMemory(mem) => mem.start_query(request).await,
        }
    }

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus> {
        match self {
            QueryBackend::Athena(athena) => athena.query_status(execution_id).await,
            #[cfg(test)]
            QueryBackend::InMemory(mem) => mem.query_status(execution_id).await,
        }
    }

    async fn query_results(&self, execution_id: &str) -> Result<QueryResults> {
        match self {
            QueryBackend::Athena(athena) => athena.query_results(execution_id).await,
            #[cfg(test)]
            QueryBackend::InMemory(mem) => mem.query_results(execution_id).await,
        }
    }
}
