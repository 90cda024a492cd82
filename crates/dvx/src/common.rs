// ai
//! 📦 Common data structures — the building blocks of dataverse
//!
//! ---
//!
//! 🎬 COLD OPEN — INT. TRADING DESK — 3:47 AM
//!
//! 🌩️  The ticker scrolls. Bitcoin is up. Bitcoin is down. Bitcoin is a
//! sideways emoji. Somewhere a cron job wakes up, asks an API for the top ten
//! coins, and gets back a JSON array so wide it needs its own zip code.
//!
//! ✅ We keep five columns. Five. The rest of the JSON is a buffet we walk past
//! with the discipline of someone who already ate. A `MarketRecord` carries
//! what the wire said. A `BronzeRecord` carries what we wrote down. A
//! `SilverRecord` carries what we wish the wire had said in the first place.
//!
//! 🦆
//!
//! ⚠️  NOTE: Prices are `f64`. If you are reading this and thinking about
//! decimals, you are correct, and also this is a dashboard, not a ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ⏰ The one timestamp format every row, log entry, and audit query in this crate agrees on.
/// `2026-10-17 03:47:00` — no `T`, no `Z`, no timezone drama. It's UTC. It's always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 🔧 Render a UTC instant the way the bronze CSV, silver CSV, and metadata log expect it.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// 📡 One coin, as the market API described it.
///
/// The API sends ~30 fields per coin. We deserialize five and let serde politely
/// ignore the rest, like a bouncer who only checks the names on the list.
/// Numbers are `Option` because the API will, occasionally, send `null` for a
/// coin's market cap. No reason given. It just does that.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketRecord {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
}

/// 🥉 A bronze row — the raw snapshot, stamped with when we took it.
///
/// Immutable once written. Column order is the CSV column order, and the CSV column
/// order is a contract with every crawler and query that reads the bronze zone later.
/// Reorder these fields and a Glue table somewhere quietly starts lying.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BronzeRecord {
    pub id: String,
    pub symbol: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    /// ⏰ ingestion time, `TIMESTAMP_FORMAT`, UTC
    pub timestamp: String,
}

impl BronzeRecord {
    /// 🕳️ True when any numeric cell is missing — the extract stage warns about these.
    pub fn has_missing_values(&self) -> bool {
        self.current_price.is_none() || self.market_cap.is_none() || self.total_volume.is_none()
    }
}

/// 🏷️ The four capitalization tiers. Right-closed bins, because that's how the
/// analysts drew them on the whiteboard and nobody was brave enough to erase it.
///
/// | tier      | market cap range     |
/// |-----------|----------------------|
/// | Small Cap | (0, 1e9]             |
/// | Mid Cap   | (1e9, 10e9]          |
/// | Large Cap | (10e9, 100e9]        |
/// | Mega Cap  | (100e9, 1e12]        |
///
/// Anything outside (zero, negative, or north of a trillion) gets no tier at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CapTier {
    #[serde(rename = "Small Cap")]
    Small,
    #[serde(rename = "Mid Cap")]
    Mid,
    #[serde(rename = "Large Cap")]
    Large,
    #[serde(rename = "Mega Cap")]
    Mega,
}

impl CapTier {
    /// 🪣 Bucket a market cap. Returns `None` outside `(0, 1e12]`.
    pub fn from_market_cap(market_cap: f64) -> Option<Self> {
        // -- 📐 right-closed: 1e9 exactly is Small, 1e9 + a penny is Mid.
        // -- NaN fails every comparison and falls through to None, which is the correct mood.
        if market_cap > 0.0 && market_cap <= 1e9 {
            Some(Self::Small)
        } else if market_cap > 1e9 && market_cap <= 10e9 {
            Some(Self::Mid)
        } else if market_cap > 10e9 && market_cap <= 100e9 {
            Some(Self::Large)
        } else if market_cap > 100e9 && market_cap <= 1e12 {
            Some(Self::Mega)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "Small Cap",
            Self::Mid => "Mid Cap",
            Self::Large => "Large Cap",
            Self::Mega => "Mega Cap",
        }
    }
}

impl std::fmt::Display for CapTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 🥈 A silver row — deduplicated, null-scrubbed, and wearing two derived columns
/// like a new pair of shoes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SilverRecord {
    pub id: String,
    pub symbol: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub total_volume: Option<f64>,
    pub timestamp: String,
    /// 📊 price / volume. `None` when volume is zero or missing — dividing by zero
    /// is a career-limiting move and we have mortgages.
    pub price_to_volume_ratio: Option<f64>,
    pub market_cap_category: Option<CapTier>,
    pub processed_timestamp: String,
}

/// 🪵 One row of the `extraction_logs` audit table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionLogEntry {
    pub id: i64,
    pub run_timestamp: String,
    pub source_api: String,
    pub record_count: i64,
    pub status: String,
    pub s3_path: Option<String>,
    pub runtime_seconds: f64,
}
