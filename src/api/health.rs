//! Health check endpoint

use crate::{api::AppState, errors::Result};
use axum::{Json, extract::State};
use serde_json::{Value, json};

/// GET /api/health - also pings the database
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>> {
    state.db.ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "service": "taproom",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
