// ai
//! 📄 CSV codec — rows in, bytes out, and back again.
//!
//! Header row first (even with zero rows), empty cells for `None`, no index column. The crawler infers the
//! table schema from this header, so field order in the record structs IS the schema.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::common::{BronzeRecord, SilverRecord};

/// 🏷️ A row type with a fixed column list, so even zero rows still get a header.
pub trait CsvRecord: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl CsvRecord for BronzeRecord {
    const COLUMNS: &'static [&'static str] = &["id", "symbol", "current_price", "market_cap", "total_volume", "timestamp"];
}

impl CsvRecord for SilverRecord {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "symbol",
        "current_price",
        "market_cap",
        "total_volume",
        "timestamp",
        "price_to_volume_ratio",
        "market_cap_category",
        "processed_timestamp",
    ];
}

/// 📤 Serialize rows into CSV bytes. The header is always written, rows or not.
pub fn encode_csv<T: CsvRecord>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        // -- 📭 serde only learns the header from the first row, and there isn't one
        writer
            .write_record(T::COLUMNS)
            .context("💀 Could not even write the header. Impressive, in a bad way.")?;
    }
    for row in rows {
        writer
            .serialize(row)
            .context("💀 A row refused to become CSV. Commas were involved. Probably.")?;
    }
    writer
        .into_inner()
        .context("💀 The CSV writer would not let go of its buffer. Separation anxiety.")
}

/// 📥 Parse CSV bytes (with header) into rows. Empty cells become `None`.
pub fn decode_csv<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let the_rows: Result<Vec<T>> = reader
        .deserialize()
        .enumerate()
        .map(|(index, row)| {
            // -- 📏 +2: one for the header, one because humans count from 1
            row.with_context(|| format!("💀 CSV row {} did not match the expected columns", index + 2))
        })
        .collect();
    the_rows
}

/// 💾 Write rows to a local CSV file, creating parent directories as needed.
pub async fn write_csv_file<T: CsvRecord>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!(
                "💀 Could not create '{}'. The directory said no. Permissions, probably.",
                parent.display()
            )
        })?;
    }
    let the_bytes = encode_csv(rows)?;
    tokio::fs::write(path, the_bytes)
        .await
        .with_context(|| format!("💀 Could not write the CSV to '{}'", path.display()))
}
