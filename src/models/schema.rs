use indexmap::IndexMap;
use serde::Serialize;

/// A sampled row: column name → value as text, in column order. NULL stays null.
pub type SampleRow = IndexMap<String, Option<String>>;

/// Result of the connectivity probe behind `/api/db-test`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbConnectivity {
    pub connection: &'static str,
    pub tables: Vec<String>,
}

impl DbConnectivity {
    pub fn new(probe_ok: bool, tables: Vec<String>) -> Self {
        Self {
            connection: if probe_ok { "success" } else { "failed" },
            tables,
        }
    }
}

/// What `/api/db-inspect` found in the `inventory` schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InspectReport {
    /// `stock_levels` exists: its columns plus a few raw rows.
    StockTable {
        tables: Vec<String>,
        stock_levels_columns: Vec<String>,
        sample_data: Vec<SampleRow>,
    },
    /// `stock_levels` is absent: point at whatever tables carry a `sku` column.
    Fallback {
        tables: Vec<String>,
        tables_with_sku_column: Vec<String>,
    },
}
