use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{DbConnectivity, InspectReport, StockLevel};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStockStore;

pub const INVENTORY_SCHEMA: &str = "inventory";
pub const STOCK_TABLE: &str = "stock_levels";
pub const SAMPLE_ROW_LIMIT: i64 = 5;

/// Read access to stock levels and the surrounding catalog.
///
/// Each call runs on a single session that is released when the call returns,
/// whether it succeeded or not.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// `SELECT 1` probe plus the table names in the `public` schema.
    async fn connectivity(&self) -> AppResult<DbConnectivity>;

    /// Up to `limit` rows, ordered by `stock_level_id`.
    async fn list_stock(&self, limit: i64) -> AppResult<Vec<StockLevel>>;

    /// First row carrying `sku`, if any.
    async fn stock_for_sku(&self, sku: &str) -> AppResult<Option<StockLevel>>;

    /// Warehouse location of every row carrying `sku`. Empty when the SKU is unknown.
    async fn locations_for_sku(&self, sku: &str) -> AppResult<Vec<Option<String>>>;

    /// Quantity per SKU for the SKUs that exist. Unknown SKUs are simply absent.
    async fn quantities_for_skus(&self, skus: &[String]) -> AppResult<HashMap<String, Option<i32>>>;

    /// Describe the `inventory` schema for debugging.
    async fn inspect(&self) -> AppResult<InspectReport>;
}
