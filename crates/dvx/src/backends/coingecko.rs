// ai
//! 🪙📡 CoinGecko Backend — the faucet at the top of the pipeline.
//!
//! INT. PUBLIC API — RATE LIMITED — ALWAYS. The market endpoint hands out the
//! top coins by market cap to anyone who asks nicely, about thirty times a minute.
//! Ask a thirty-first time and it answers with a 429 and a `Retry-After` header,
//! which is the HTTP equivalent of a librarian pointing at the clock.
//!
//! 🧠 Knowledge graph:
//! - Same pattern as `s3/`, `glue/`, `athena/`, `in_mem/`
//! - Config co-located: `CoinGeckoSourceConfig` lives in `coingecko_source.rs`
//! - Errors typed: `FetchError` knows which failures deserve a retry
//! - Transport: reqwest GET → text → serde_json → `Vec<MarketRecord>`
//!
//! 🦆 The duck checked the price of bitcoin once. The duck does not talk about it.

mod coingecko_source;

pub use coingecko_source::{CoinGeckoSource, CoinGeckoSourceConfig, FetchError};
