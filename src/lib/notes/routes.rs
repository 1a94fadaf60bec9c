//! This module includes all routes used for managing notes.
use std::sync::Arc;

use axum::{body::Bytes, extract::Query, Extension, Json};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    notes::{
        request::{NotePayload, SearchParams},
        response::MessageResponse,
        NoteError, NoteId,
    },
    state::AppState,
    store::{Note, StoreError},
};

/// Decodes a JSON body whatever its content type, turning a decode failure
/// into a client error.
fn parse_payload(body: &[u8]) -> Result<NotePayload, NoteError> {
    let payload = serde_json::from_slice::<NotePayload>(body).map_err(|err| {
        warn!("rejected note body: {}", err);
        NoteError::InvalidBody(err.to_string())
    })?;

    payload.validate().map_err(|err| {
        warn!("note body was missing a title or content");
        err
    })?;

    Ok(payload)
}

fn storage_failure(err: StoreError) -> NoteError {
    error!("note storage failed: {:?}", err);
    NoteError::Storage(err)
}

/// Creates a note from the request body.
#[instrument(skip(state, body))]
pub async fn create_note(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Note>, NoteError> {
    let payload = parse_payload(&body)?;
    let note = state
        .store
        .create(&payload.title, &payload.content)
        .map_err(storage_failure)?;

    info!("created note {}", note.id);

    Ok(Json(note))
}

/// Lists every note, or only those matching the `q` query parameter.
#[instrument(skip(state))]
pub async fn list_notes(
    Extension(state): Extension<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Note>>, NoteError> {
    let params = SearchParams::from_pairs(pairs);
    let notes = match params.q.as_deref() {
        Some(query) if !query.is_empty() => {
            debug!("searching notes for {:?}", query);
            state.store.search(query)
        }
        _ => state.store.list(),
    }
    .map_err(storage_failure)?;

    Ok(Json(notes))
}

/// Replaces the title and content of an existing note.
#[instrument(skip(state, body))]
pub async fn update_note(
    NoteId(id): NoteId,
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Note>, NoteError> {
    if state.store.get(id).map_err(storage_failure)?.is_none() {
        warn!("attempted to update missing note {}", id);
        return Err(NoteError::NotFound);
    }

    let payload = parse_payload(&body)?;
    let note = state
        .store
        .update(id, &payload.title, &payload.content)
        .map_err(storage_failure)?
        .ok_or(NoteError::NotFound)?;

    info!("updated note {}", note.id);

    Ok(Json(note))
}

/// Soft deletes a note.
#[instrument(skip(state))]
pub async fn delete_note(
    NoteId(id): NoteId,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<MessageResponse>, NoteError> {
    if !state.store.soft_delete(id).map_err(storage_failure)? {
        warn!("attempted to delete missing note {}", id);
        return Err(NoteError::NotFound);
    }

    info!("deleted note {}", id);

    Ok(Json(MessageResponse {
        message: "Note deleted".to_owned(),
    }))
}
