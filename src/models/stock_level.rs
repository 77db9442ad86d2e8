use std::collections::BTreeSet;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};

/// One row of `inventory.stock_levels`: a SKU held at one warehouse location.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StockLevel {
    pub stock_level_id: i32,
    pub product_id: Option<i32>,
    /// Nullable in tables created before this service ran.
    pub sku: Option<String>,
    pub quantity: Option<i32>,
    pub warehouse_location: Option<String>,
    /// Rendered as `YYYY-MM-DD HH:MM:SS[.ffffff]` for transport; the fraction
    /// is printed with six digits, and only when non-zero.
    #[serde(serialize_with = "timestamp_as_string")]
    pub last_updated: Option<NaiveDateTime>,
}

fn timestamp_as_string<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
        None => serializer.serialize_none(),
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

// ── Responses ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SkuQuantity {
    pub sku: String,
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SkuLocations {
    pub sku: String,
    pub locations: Vec<Option<String>>,
}

/// Per-SKU outcome of a batch lookup. A missing SKU is data, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Found { quantity: Option<i32> },
    Missing { error: &'static str },
}

impl BatchEntry {
    pub fn missing() -> Self {
        BatchEntry::Missing {
            error: "Product not found",
        }
    }
}

// ── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct BatchStockParams {
    /// Comma-separated SKUs, e.g. `ALPHA-WDG-001,BASIC-WDG-002`.
    pub skus: Option<String>,
}

/// Split a comma-separated SKU list into its distinct, sorted entries.
/// Surrounding whitespace is dropped and empty entries are skipped.
pub fn parse_sku_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|sku| !sku.is_empty())
        .map(str::to_string)
        .collect()
}
