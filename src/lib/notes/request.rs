//! This module declares all types that may be used as request payloads.
use serde::{Deserialize, Serialize};

/// The body accepted when creating or updating a note. Missing fields
/// deserialize as empty strings so they fail validation rather than parsing.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NotePayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Query string accepted when listing notes.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    /// Builds the params from raw query pairs. When `q` is repeated the first
    /// value is used.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let q = pairs
            .into_iter()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value);

        SearchParams { q }
    }
}
