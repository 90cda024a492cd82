// ai
//! 🥈 Silver Refinery — where bronze rows go to get their act together.
//!
//! Four steps, in this exact order, because the order is observable:
//!
//! 1. 🔁 dedupe by `id`, first occurrence wins
//! 2. 🕳️ drop rows missing `current_price` or `market_cap`
//! 3. ➗ `price_to_volume_ratio = price / volume`, `None` when volume is 0 or missing
//! 4. 🏷️ `market_cap_category` via the right-closed tier bins
//!
//! ⚠️ Dedupe runs BEFORE the null filter. If the first `bitcoin` row has a null
//! price and the second is perfect, the first wins the dedupe and then gets dropped,
//! and bitcoin is absent from silver entirely. Surprising? Yes. Load-bearing? Also yes:
//! every silver partition ever written was produced this way.
//!
//! 📜 "He who filters before he dedupes, changes history and calls it a refactor."

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::BatchTransform;
use crate::common::{BronzeRecord, CapTier, SilverRecord, format_timestamp};

/// 🥈 BronzeRecord → SilverRecord, with judgment.
pub struct SilverRefinery;

/// 🕳️ A cell counts as present only if it's there AND it's a number. NaN is null in a trench coat.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// ➗ price / volume, or `None` when the division would be a lie.
pub fn price_to_volume_ratio(price: f64, volume: Option<f64>) -> Option<f64> {
    match present(volume) {
        Some(v) if v != 0.0 => Some(price / v),
        _ => None,
    }
}

impl BatchTransform for SilverRefinery {
    type Input = BronzeRecord;
    type Output = SilverRecord;

    fn transform_batch(input: Vec<BronzeRecord>, at: DateTime<Utc>) -> Vec<SilverRecord> {
        let the_processed_timestamp = format_timestamp(at);
        let mut seen_ids: HashSet<String> = HashSet::with_capacity(input.len());

        input
            .into_iter()
            // -- 🔁 step 1: `insert` returns false for the second bitcoin. bye, second bitcoin.
            .filter(|row| seen_ids.insert(row.id.clone()))
            // -- 🕳️ step 2: no price or no cap, no entry
            .filter_map(|row| {
                let the_price = present(row.current_price)?;
                let the_market_cap = present(row.market_cap)?;
                Some((row, the_price, the_market_cap))
            })
            // -- ➗🏷️ steps 3 + 4
            .map(|(row, the_price, the_market_cap)| SilverRecord {
                price_to_volume_ratio: price_to_volume_ratio(the_price, row.total_volume),
                market_cap_category: CapTier::from_market_cap(the_market_cap),
                id: row.id,
                symbol: row.symbol,
                current_price: the_price,
                market_cap: the_market_cap,
                total_volume: row.total_volume,
                timestamp: row.timestamp,
                processed_timestamp: the_processed_timestamp.clone(),
            })
            .collect()
    }
}
