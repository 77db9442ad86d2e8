//! Debug-only endpoints. Failures here surface with the same status codes
//! as every other route.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::{
    error::AppResult,
    models::{DbConnectivity, InspectReport},
    AppState,
};

// ── GET /api/db-test ──────────────────────────────────────────────────────────

pub async fn db_test(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DbConnectivity>)> {
    let start = Instant::now();
    let status = state.store.connectivity().await?;

    info!(
        connection = status.connection,
        tables = status.tables.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Database connectivity check"
    );

    Ok((StatusCode::OK, Json(status)))
}

// ── GET /api/db-inspect ───────────────────────────────────────────────────────

pub async fn db_inspect(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<InspectReport>)> {
    let report = state.store.inspect().await?;

    match &report {
        InspectReport::StockTable { sample_data, .. } => {
            info!(sample_rows = sample_data.len(), "Inspected stock_levels")
        }
        InspectReport::Fallback {
            tables_with_sku_column,
            ..
        } => info!(
            candidates = tables_with_sku_column.len(),
            "stock_levels missing; listed tables with a sku column"
        ),
    }

    Ok((StatusCode::OK, Json(report)))
}
