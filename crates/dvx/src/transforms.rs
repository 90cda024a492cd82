// ai
//! 🔄 Transforms — the medallion car wash 🥉➡️🥈
//!
//! 🎬 COLD OPEN — INT. DATA LAKE — SHALLOW END — 6:00 AM
//!
//! The bronze zone is muddy. Duplicate coins. Null market caps. A volume of
//! exactly zero that someone, somewhere, swears is real. The silver zone is
//! supposed to be clean. Between them stands this module, holding a squeegee.
//!
//! ## Architecture 📐
//!
//! ```text
//!   API JSON              Bronze                 Silver
//!  ┌─────────────┐      ┌──────────────┐      ┌──────────────────────┐
//!  │ MarketRecord│─────▶│ BronzeRecord │─────▶│ SilverRecord         │
//!  │ (wire)      │      │ + timestamp  │      │ + ratio, + cap tier  │
//!  └─────────────┘      └──────────────┘      │ deduped, nulls gone  │
//!    BronzeSnapshot        SilverRefinery      └──────────────────────┘
//! ```
//!
//! Each transform is a zero-sized marker type. Batch-level, not row-level: dedup needs
//! to see the whole batch, and a transform that sees the whole batch can do everything
//! else too. The CSV codec lives next door because every batch ends up as a CSV anyway.
//!
//! ## Knowledge Graph 🧠
//! - Depends on: `common::{MarketRecord, BronzeRecord, SilverRecord, CapTier}`
//! - Used by: `supervisors::stages::{extract, transform}`
//! - Pattern: zero-sized marker types + associated types = monomorphized transforms
//!
//! 🦆

use chrono::{DateTime, Utc};

pub mod bronze;
pub mod csv_codec;
pub mod silver;

pub use bronze::BronzeSnapshot;
pub use silver::SilverRefinery;

/// 🔄 BatchTransform — one batch in, one batch out, stamped with a moment in time.
///
/// # Contract 📜
///
/// - Input: owned `Vec` — the transform may move fields instead of cloning them
/// - `at`: the instant the transform runs; every output row that carries a timestamp
///   gets this one, so a batch never straddles a second boundary
/// - Infallible: anything that could fail (parsing, I/O) happens before or after
pub trait BatchTransform {
    type Input;
    type Output;

    fn transform_batch(input: Vec<Self::Input>, at: DateTime<Utc>) -> Vec<Self::Output>;
}
