use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{PgPool, Postgres, Row};
use tracing::{debug, info};

use super::{StockStore, INVENTORY_SCHEMA, SAMPLE_ROW_LIMIT, STOCK_TABLE};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{DbConnectivity, InspectReport, SampleRow, StockLevel};

const STOCK_COLUMNS: &str =
    "stock_level_id, product_id, sku, quantity, warehouse_location, last_updated";

pub struct PgStockStore {
    pool: PgPool,
}

impl PgStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        info!(
            host = %config.db_host,
            port = config.db_port,
            database = %config.db_name,
            "Connecting to PostgreSQL..."
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect_with(config.connect_options())
            .await
            .context("could not connect to the database")?;
        info!("Database connection pool established.");
        Ok(Self::new(pool))
    }

    /// Create `inventory.stock_levels` if it does not exist yet. An existing
    /// table is used as is and nothing is written, so a read-only role works.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        if self.stock_table_exists().await? {
            info!("inventory.stock_levels present; skipping migrations.");
            return Ok(());
        }

        info!("inventory.stock_levels missing; running migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("migrations failed")?;
        info!("Migrations complete.");
        Ok(())
    }

    async fn stock_table_exists(&self) -> anyhow::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT to_regclass('inventory.stock_levels') IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await
        .context("could not look up inventory.stock_levels")?;
        Ok(exists)
    }

    /// Check out one connection for the duration of a request. Dropping it
    /// hands it back to the pool.
    async fn session(&self) -> AppResult<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn connectivity(&self) -> AppResult<DbConnectivity> {
        let mut conn = self.session().await?;
        let probe: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&mut *conn).await?;
        let tables = list_tables(&mut conn, "public").await?;
        Ok(DbConnectivity::new(probe == 1, tables))
    }

    async fn list_stock(&self, limit: i64) -> AppResult<Vec<StockLevel>> {
        let mut conn = self.session().await?;
        let rows = sqlx::query_as::<_, StockLevel>(&format!(
            "SELECT {STOCK_COLUMNS} FROM inventory.stock_levels ORDER BY stock_level_id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    async fn stock_for_sku(&self, sku: &str) -> AppResult<Option<StockLevel>> {
        let mut conn = self.session().await?;
        let row = sqlx::query_as::<_, StockLevel>(&format!(
            "SELECT {STOCK_COLUMNS} FROM inventory.stock_levels
             WHERE sku = $1 ORDER BY stock_level_id LIMIT 1"
        ))
        .bind(sku)
        .fetch_optional(&mut *conn)
        .await?;
        debug!(sku, found = row.is_some(), "Stock lookup");
        Ok(row)
    }

    async fn locations_for_sku(&self, sku: &str) -> AppResult<Vec<Option<String>>> {
        let mut conn = self.session().await?;
        let locations = sqlx::query_scalar::<_, Option<String>>(
            "SELECT warehouse_location FROM inventory.stock_levels
             WHERE sku = $1 ORDER BY stock_level_id",
        )
        .bind(sku)
        .fetch_all(&mut *conn)
        .await?;
        Ok(locations)
    }

    async fn quantities_for_skus(&self, skus: &[String]) -> AppResult<HashMap<String, Option<i32>>> {
        if skus.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.session().await?;
        // DISTINCT ON keeps the lowest stock_level_id per SKU, same row as stock_for_sku.
        let rows = sqlx::query_as::<_, (String, Option<i32>)>(
            "SELECT DISTINCT ON (sku) sku, quantity FROM inventory.stock_levels
             WHERE sku = ANY($1) ORDER BY sku, stock_level_id",
        )
        .bind(skus)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn inspect(&self) -> AppResult<InspectReport> {
        let mut conn = self.session().await?;
        let tables = list_tables(&mut conn, INVENTORY_SCHEMA).await?;

        if tables.iter().any(|t| t == STOCK_TABLE) {
            let columns = list_columns(&mut conn, INVENTORY_SCHEMA, STOCK_TABLE).await?;
            let sample_data =
                sample_rows(&mut conn, INVENTORY_SCHEMA, STOCK_TABLE, &columns, SAMPLE_ROW_LIMIT)
                    .await?;
            Ok(InspectReport::StockTable {
                tables,
                stock_levels_columns: columns,
                sample_data,
            })
        } else {
            let tables_with_sku_column = tables_with_column(&mut conn, INVENTORY_SCHEMA, "sku").await?;
            Ok(InspectReport::Fallback {
                tables,
                tables_with_sku_column,
            })
        }
    }
}

// ── Catalog queries ───────────────────────────────────────────────────────────
// information_schema exposes `sql_identifier`, which is cast to text for decoding.

pub async fn list_tables(conn: &mut PgConnection, schema: &str) -> AppResult<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        "SELECT table_name::text FROM information_schema.tables
         WHERE table_schema = $1 ORDER BY table_name",
    )
    .bind(schema)
    .fetch_all(&mut *conn)
    .await?;
    Ok(tables)
}

pub async fn list_columns(conn: &mut PgConnection, schema: &str, table: &str) -> AppResult<Vec<String>> {
    let columns = sqlx::query_scalar::<_, String>(
        "SELECT column_name::text FROM information_schema.columns
         WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position",
    )
    .bind(schema)
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;
    Ok(columns)
}

pub async fn tables_with_column(
    conn: &mut PgConnection,
    schema: &str,
    column: &str,
) -> AppResult<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT table_name::text AS name FROM information_schema.columns
         WHERE table_schema = $1 AND column_name = $2 ORDER BY name",
    )
    .bind(schema)
    .bind(column)
    .fetch_all(&mut *conn)
    .await?;
    Ok(tables)
}

/// First `limit` rows of `schema.table`, each value rendered as text.
pub async fn sample_rows(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
    columns: &[String],
    limit: i64,
) -> AppResult<Vec<SampleRow>> {
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query(&sample_query(schema, table, columns))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(i, name)| Ok((name.clone(), row.try_get::<Option<String>, _>(i)?)))
                .collect::<AppResult<SampleRow>>()
        })
        .collect()
}

fn sample_query(schema: &str, table: &str, columns: &[String]) -> String {
    let projection = columns
        .iter()
        .map(|c| format!("{}::text", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {} FROM {}.{} LIMIT $1",
        projection,
        quote_ident(schema),
        quote_ident(table)
    )
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
