// ai
//! 🕷️📚 Glue Backend — the crawler that reads the silver bucket and writes a table.
//!
//! 🧠 Knowledge graph:
//! - Same pattern as `s3/`, `athena/`, `in_mem/`
//! - Config co-located: `CatalogConfig` lives in `glue_crawler.rs`
//! - Trait impl: `impl Crawler for GlueCrawler`
//! - Enum variant: `CrawlerBackend::Glue(GlueCrawler)`

mod glue_crawler;

pub use glue_crawler::CatalogConfig;
pub(crate) use glue_crawler::GlueCrawler;
