// ai
//! 🔎📊 Athena Backend — SQL over the silver bucket, billed by the byte scanned.
//!
//! 🧠 Knowledge graph:
//! - Same pattern as `s3/`, `glue/`, `in_mem/`
//! - Config co-located: `QueryConfig` lives in `athena_query.rs`
//! - Trait impl: `impl QueryEngine for AthenaQueryEngine`
//! - Enum variant: `QueryBackend::Athena(AthenaQueryEngine)`

mod athena_query;

pub use athena_query::QueryConfig;
pub(crate) use athena_query::AthenaQueryEngine;
