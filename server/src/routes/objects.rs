//! Object endpoint routes.
//!
//! `/objects/{kind}` lists and creates, `/objects/{kind}/{id}` gets,
//! replaces and deletes. Other methods on these paths answer 405.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use simplyput_engine::{Document, ListRequest, Page};

use crate::auth::Namespace;
use crate::error::Result;
use crate::handlers::{
    handle_create, handle_delete, handle_get, handle_list, handle_update, parse_body,
};
use crate::AppState;

/// Create object routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/objects/{kind}", get(list_handler).post(create_handler))
        .route(
            "/objects/{kind}/{id}",
            get(get_handler).post(update_handler).delete(delete_handler),
        )
}

/// GET /objects/{kind} - List one page of records.
///
/// The query string is validated before the store is touched.
async fn list_handler(
    State(state): State<AppState>,
    namespace: Namespace,
    Path(kind): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Page>> {
    let request = ListRequest::from_pairs(params)?;
    let page = handle_list(&state, namespace.qualify(&kind), request).await?;
    Ok(Json(page))
}

/// POST /objects/{kind} - Create a record.
async fn create_handler(
    State(state): State<AppState>,
    namespace: Namespace,
    Path(kind): Path<String>,
    body: Bytes,
) -> Result<Json<Document>> {
    let body = parse_body(&body)?;
    let created = handle_create(&state, namespace.qualify(&kind), body).await?;
    Ok(Json(created))
}

/// GET /objects/{kind}/{id} - Fetch a record.
async fn get_handler(
    State(state): State<AppState>,
    namespace: Namespace,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Document>> {
    let record = handle_get(&state, namespace.qualify(&kind), id).await?;
    Ok(Json(record))
}

/// POST /objects/{kind}/{id} - Replace a record's body.
async fn update_handler(
    State(state): State<AppState>,
    namespace: Namespace,
    Path((kind, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Document>> {
    let body = parse_body(&body)?;
    let updated = handle_update(&state, namespace.qualify(&kind), id, body).await?;
    Ok(Json(updated))
}

/// DELETE /objects/{kind}/{id} - Delete a record.
async fn delete_handler(
    State(state): State<AppState>,
    namespace: Namespace,
    Path((kind, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    handle_delete(&state, namespace.qualify(&kind), id).await?;
    Ok(StatusCode::OK)
}
