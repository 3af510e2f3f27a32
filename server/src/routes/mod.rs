//! HTTP route definitions.

mod discovery;
mod health;
mod objects;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(objects::routes())
        .merge(discovery::routes())
}
