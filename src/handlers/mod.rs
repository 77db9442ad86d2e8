pub mod diagnostics;
pub mod products;

use axum::{http::StatusCode, Json};
use serde_json::json;

/// Liveness message; never touches the database.
pub async fn root() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "message": "Product API is running" })))
}
