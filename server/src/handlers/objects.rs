//! Object handlers - run record operations against the shared store.
//!
//! Record operations are synchronous and hold a store lock, so each one runs
//! on the blocking pool. A request that is dropped mid-flight does not
//! cancel the task; its transaction still commits or rolls back. With a
//! snapshot file configured, a write commits only once the file is saved.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::body::Bytes;
use simplyput_engine::{Document, ListRequest, MemoryDatastore, Page, Records, ID_KEY};

/// Decode a request body, which must be a JSON object.
pub fn parse_body(body: &Bytes) -> Result<Document> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("invalid body: {e}")))
}

/// Run a store operation on the blocking pool.
pub(crate) async fn blocking<T, F>(state: &AppState, op: F) -> Result<T>
where
    F: FnOnce(&Records<MemoryDatastore>) -> simplyput_engine::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || op(store.as_ref()).map_err(AppError::from))
        .await
        .map_err(|e| AppError::Internal(format!("store task failed: {e}")))?
}

/// Create a record of `kind`.
pub async fn handle_create(state: &AppState, kind: String, body: Document) -> Result<Document> {
    let target = kind.clone();
    let created = blocking(state, move |records| records.create(&target, body)).await?;

    tracing::debug!(
        kind = %kind,
        id = created.get(ID_KEY).and_then(|id| id.as_str()).unwrap_or_default(),
        "Created record"
    );
    Ok(created)
}

/// Fetch one record.
pub async fn handle_get(state: &AppState, kind: String, id: String) -> Result<Document> {
    blocking(state, move |records| records.get(&kind, &id)).await
}

/// Replace the body of one record.
pub async fn handle_update(
    state: &AppState,
    kind: String,
    id: String,
    body: Document,
) -> Result<Document> {
    let (target, target_id) = (kind.clone(), id.clone());
    let updated = blocking(state, move |records| {
        records.update(&target, &target_id, body)
    })
    .await?;

    tracing::debug!(kind = %kind, id = %id, "Updated record");
    Ok(updated)
}

/// Delete one record.
pub async fn handle_delete(state: &AppState, kind: String, id: String) -> Result<()> {
    let (target, target_id) = (kind.clone(), id.clone());
    blocking(state, move |records| records.delete(&target, &target_id)).await?;

    tracing::debug!(kind = %kind, id = %id, "Deleted record");
    Ok(())
}

/// Fetch one page of records.
pub async fn handle_list(state: &AppState, kind: String, request: ListRequest) -> Result<Page> {
    blocking(state, move |records| records.list(&kind, &request)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_must_be_an_object() {
        assert!(parse_body(&Bytes::from_static(br#"{"a": [1, 2]}"#)).is_ok());

        for body in [&b"[1, 2]"[..], b"\"text\"", b"42", b"{broken", b""] {
            assert!(matches!(
                parse_body(&Bytes::copy_from_slice(body)),
                Err(AppError::BadRequest(_))
            ));
        }
    }
}
