// ai
//! 🥉 Bronze Snapshot — wire records get a timestamp and a place to live. That's it.
//!
//! No cleaning here. Bronze is the "as received" zone: if the API said null, we
//! write null. If the API sent the same coin twice, we write it twice. Silver is
//! where judgment happens. Bronze is a notary, not a critic.

use chrono::{DateTime, Utc};

use super::BatchTransform;
use crate::common::{BronzeRecord, MarketRecord, format_timestamp};

/// 🥉 MarketRecord → BronzeRecord, one-to-one, order preserved.
pub struct BronzeSnapshot;

impl BatchTransform for BronzeSnapshot {
    type Input = MarketRecord;
    type Output = BronzeRecord;

    fn transform_batch(input: Vec<MarketRecord>, at: DateTime<Utc>) -> Vec<BronzeRecord> {
        // -- ⏰ one timestamp for the whole batch, formatted once
        let the_timestamp = format_timestamp(at);
        input
            .into_iter()
            .map(|record| BronzeRecord {
                id: record.id,
                symbol: record.symbol,
                current_price: record.current_price,
                market_cap: record.market_cap,
                total_volume: record.total_volume,
                timestamp: the_timestamp.clone(),
            })
            .collect()
    }
}
