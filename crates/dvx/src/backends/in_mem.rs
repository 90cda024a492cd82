//! # Previously, on dvx...
//!
//! 🎬 The pipeline talks to four things it does not own: a market API, a bucket,
//! a crawler, and a query engine. Three of those bill by the request. Tests do
//! not have a credit card. So this module fakes the last three, entirely in RAM,
//! gone the moment the test ends.
//!
//! Each fake keeps its state behind an `Arc<tokio::sync::Mutex<...>>` and is
//! `Clone`, so a test can hand one copy to the pipeline and keep another to
//! inspect what arrived. Same trick as always. Still works.
//!
//! 🦆
//!
//! ⚠️ This is NOT for production. If `InMemoryObjectStore` is holding your
//! bronze layer in prod, the bronze layer is one restart from being a rumor.

mod in_mem_crawler;
mod in_mem_object_store;
mod in_mem_query;

pub(crate) use in_mem_crawler::InMemoryCrawler;
pub(crate) use in_mem_object_store::InMemoryObjectStore;
pub(crate) use in_mem_query::InMemoryQueryEngine;
