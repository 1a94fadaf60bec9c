//! This module store the type for the collective state of the application.
use crate::store::NoteStore;

/// The shared state for the application.
#[derive(Debug)]
pub struct AppState {
    /// Where notes are persisted.
    pub store: NoteStore,
}

impl AppState {
    /// Creates a new [`AppState`] around an already opened store.
    pub fn new(store: NoteStore) -> Self {
        AppState { store }
    }
}
