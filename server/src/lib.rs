//! SimplyPut Server - REST front end for the SimplyPut document store.
//!
//! Exposes create/get/replace/delete/list on `/objects/{kind}[/{id}]`
//! over a [`MemoryDatastore`](simplyput_engine::MemoryDatastore), with
//! optional token namespacing and an optional snapshot file.

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod routes;

use crate::config::Config;
use crate::db::{PersistenceError, SnapshotFile, Store};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the state, restoring the store from `config.data_path`.
    pub fn new(config: Config) -> Result<Self, PersistenceError> {
        let snapshots = config
            .data_path
            .as_ref()
            .map(|path| Arc::new(SnapshotFile::new(path)));
        let store = db::create_store(snapshots)?;

        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
