use std::collections::HashMap;

use async_trait::async_trait;

use super::{StockStore, SAMPLE_ROW_LIMIT, STOCK_TABLE};
use crate::error::{AppError, AppResult};
use crate::models::{format_timestamp, DbConnectivity, InspectReport, SampleRow, StockLevel};

/// In-memory stand-in for the database, used by route tests.
#[derive(Debug, Default)]
pub struct MemoryStockStore {
    rows: Vec<StockLevel>,
    public_tables: Vec<String>,
    /// Tables in the inventory schema, with their columns.
    inventory_tables: Vec<(String, Vec<String>)>,
    unavailable: bool,
}

impl MemoryStockStore {
    /// Store whose inventory schema holds a `stock_levels` table with `rows`.
    pub fn with_rows(rows: Vec<StockLevel>) -> Self {
        let columns = [
            "stock_level_id",
            "product_id",
            "sku",
            "quantity",
            "warehouse_location",
            "last_updated",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();

        Self {
            rows,
            inventory_tables: vec![(STOCK_TABLE.to_string(), columns)],
            ..Self::default()
        }
    }

    pub fn public_tables(mut self, tables: &[&str]) -> Self {
        self.public_tables = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Replace the inventory schema contents.
    pub fn inventory_tables(mut self, tables: Vec<(&str, Vec<&str>)>) -> Self {
        self.inventory_tables = tables
            .into_iter()
            .map(|(name, cols)| (name.to_string(), cols.into_iter().map(str::to_string).collect()))
            .collect();
        self
    }

    /// Every call fails as if the pool could not hand out a connection.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn session(&self) -> AppResult<()> {
        if self.unavailable {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn sample(row: &StockLevel) -> SampleRow {
        let mut out = SampleRow::new();
        out.insert("stock_level_id".into(), Some(row.stock_level_id.to_string()));
        out.insert("product_id".into(), row.product_id.map(|v| v.to_string()));
        out.insert("sku".into(), row.sku.clone());
        out.insert("quantity".into(), row.quantity.map(|v| v.to_string()));
        out.insert("warehouse_location".into(), row.warehouse_location.clone());
        out.insert("last_updated".into(), row.last_updated.as_ref().map(format_timestamp));
        out
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn connectivity(&self) -> AppResult<DbConnectivity> {
        self.session()?;
        Ok(DbConnectivity::new(true, self.public_tables.clone()))
    }

    async fn list_stock(&self, limit: i64) -> AppResult<Vec<StockLevel>> {
        self.session()?;
        let mut rows = self.rows.clone();
        rows.sort_by_key(|r| r.stock_level_id);
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn stock_for_sku(&self, sku: &str) -> AppResult<Option<StockLevel>> {
        self.session()?;
        Ok(self
            .rows
            .iter()
            .filter(|r| r.sku.as_deref() == Some(sku))
            .min_by_key(|r| r.stock_level_id)
            .cloned())
    }

    async fn locations_for_sku(&self, sku: &str) -> AppResult<Vec<Option<String>>> {
        self.session()?;
        let mut matching: Vec<&StockLevel> = self
            .rows
            .iter()
            .filter(|r| r.sku.as_deref() == Some(sku))
            .collect();
        matching.sort_by_key(|r| r.stock_level_id);
        Ok(matching.into_iter().map(|r| r.warehouse_location.clone()).collect())
    }

    async fn quantities_for_skus(&self, skus: &[String]) -> AppResult<HashMap<String, Option<i32>>> {
        self.session()?;
        let mut found = HashMap::new();
        for sku in skus {
            if let Some(row) = self.stock_for_sku(sku).await? {
                found.insert(sku.clone(), row.quantity);
            }
        }
        Ok(found)
    }

    async fn inspect(&self) -> AppResult<InspectReport> {
        self.session()?;
        let tables: Vec<String> = self.inventory_tables.iter().map(|(t, _)| t.clone()).collect();

        match self.inventory_tables.iter().find(|(t, _)| t == STOCK_TABLE) {
            Some((_, columns)) => Ok(InspectReport::StockTable {
                tables,
                stock_levels_columns: columns.clone(),
                sample_data: self
                    .rows
                    .iter()
                    .take(SAMPLE_ROW_LIMIT as usize)
                    .map(Self::sample)
                    .collect(),
            }),
            None => Ok(InspectReport::Fallback {
                tables,
                tables_with_sku_column: self
                    .inventory_tables
                    .iter()
                    .filter(|(_, cols)| cols.iter().any(|c| c == "sku"))
                    .map(|(t, _)| t.clone())
                    .collect(),
            }),
        }
    }
}
