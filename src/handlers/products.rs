use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{parse_sku_list, BatchEntry, BatchStockParams, SkuLocations, SkuQuantity},
    AppState,
};

/// Hard cap on `/api/products/all`.
pub const LIST_LIMIT: i64 = 10;

// ── GET /api/products/all ─────────────────────────────────────────────────────

pub async fn list_all(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let start = Instant::now();
    let rows = state.store.list_stock(LIST_LIMIT).await?;

    info!(
        count = rows.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed stock levels"
    );

    if rows.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(json!({ "message": "No products found in database" })),
        ));
    }

    Ok((StatusCode::OK, Json(json!({ "products": rows }))))
}

// ── GET /api/products/batch/stock?skus=A,B ────────────────────────────────────

pub async fn batch_stock(
    State(state): State<AppState>,
    params: Result<Query<BatchStockParams>, QueryRejection>,
) -> AppResult<(StatusCode, Json<BTreeMap<String, BatchEntry>>)> {
    let Query(params) = params?;
    let raw = params
        .skus
        .ok_or_else(|| AppError::BadRequest("query parameter 'skus' is required".to_string()))?;

    let skus: Vec<String> = parse_sku_list(&raw).into_iter().collect();
    if skus.is_empty() {
        return Err(AppError::BadRequest(
            "query parameter 'skus' must list at least one SKU".to_string(),
        ));
    }

    let start = Instant::now();
    let mut found = state.store.quantities_for_skus(&skus).await?;

    let result: BTreeMap<String, BatchEntry> = skus
        .into_iter()
        .map(|sku| {
            let entry = match found.remove(&sku) {
                Some(quantity) => BatchEntry::Found { quantity },
                None => BatchEntry::missing(),
            };
            (sku, entry)
        })
        .collect();

    info!(
        requested = result.len(),
        missing = result.values().filter(|e| matches!(e, BatchEntry::Missing { .. })).count(),
        elapsed_ms = start.elapsed().as_millis(),
        "Batch stock query"
    );

    Ok((StatusCode::OK, Json(result)))
}

// ── GET /api/products/:sku/stock ──────────────────────────────────────────────

pub async fn get_stock(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<(StatusCode, Json<SkuQuantity>)> {
    let row = state
        .store
        .stock_for_sku(&sku)
        .await?
        .ok_or_else(AppError::product_not_found)?;

    Ok((
        StatusCode::OK,
        Json(SkuQuantity {
            sku,
            quantity: row.quantity,
        }),
    ))
}

// ── GET /api/products/:sku/locations ──────────────────────────────────────────

pub async fn get_locations(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<(StatusCode, Json<SkuLocations>)> {
    let locations = state.store.locations_for_sku(&sku).await?;
    if locations.is_empty() {
        return Err(AppError::product_not_found());
    }

    info!(sku = %sku, count = locations.len(), "Fetched warehouse locations");

    Ok((StatusCode::OK, Json(SkuLocations { sku, locations })))
}
