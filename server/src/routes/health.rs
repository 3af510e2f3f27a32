//! Liveness endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::Result;
use crate::handlers::objects::blocking;
use crate::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Records currently held across all kinds and namespaces
    pub records: usize,
    pub persistent: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(banner))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let records = blocking(&state, |records| Ok(records.store().record_count())).await?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        records,
        persistent: state.config.data_path.is_some(),
    }))
}

async fn banner() -> &'static str {
    "SimplyPut Datastore Server"
}
