//! Module containing everything pertaining to notes over HTTP.
use std::str::FromStr;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json, RequestPartsExt,
};
use thiserror::Error;

use crate::store::StoreError;

use self::{request::NotePayload, response::ErrorResponse};

pub mod request;
pub mod response;
pub mod routes;

/// An error type for all errors that may happen while handling a note request.
#[derive(Error, Debug)]
pub enum NoteError {
    #[error("Invalid note ID")]
    InvalidId,
    #[error("{0}")]
    InvalidBody(String),
    #[error("Title and content are required")]
    MissingFields,
    #[error("Note not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl NoteError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NoteError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: format!("{self}"),
        });

        (self.status(), body).into_response()
    }
}

/// The identifier of a note, taken from the `:id` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteId(pub i64);

impl FromStr for NoteId {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(NoteId(id)),
            _ => Err(NoteError::InvalidId),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for NoteId
where
    S: Send + Sync,
{
    type Rejection = NoteError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = parts
            .extract::<Path<String>>()
            .await
            .map_err(|_| NoteError::InvalidId)?;

        raw.parse()
    }
}

impl NotePayload {
    /// Checks that both the title and the content were provided.
    pub fn validate(&self) -> Result<(), NoteError> {
        if self.title.is_empty() || self.content.is_empty() {
            return Err(NoteError::MissingFields);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        assert_eq!("1".parse::<NoteId>().unwrap(), NoteId(1));
        assert_eq!("9001".parse::<NoteId>().unwrap(), NoteId(9001));
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "undefined", "abc", "0", "-3", "1.5", " 1"] {
            assert!(
                matches!(raw.parse::<NoteId>(), Err(NoteError::InvalidId)),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn validation_requires_both_fields() {
        let payload = |title: &str, content: &str| NotePayload {
            title: title.to_owned(),
            content: content.to_owned(),
        };

        assert!(payload("A", "B").validate().is_ok());
        assert!(payload(" ", " ").validate().is_ok());
        assert!(matches!(
            payload("", "B").validate(),
            Err(NoteError::MissingFields)
        ));
        assert!(matches!(
            payload("A", "").validate(),
            Err(NoteError::MissingFields)
        ));
    }

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(NoteError::InvalidId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            NoteError::InvalidBody("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(NoteError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(NoteError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            NoteError::Storage(StoreError::Poisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
