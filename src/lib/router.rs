//! Assembles the HTTP application: note routes, the static frontend and the
//! middleware stack shared by all of them.
use std::{any::Any, path::Path, sync::Arc};

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Extension, Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::error;

use crate::{
    notes::{
        response::ErrorResponse,
        routes::{create_note, delete_note, list_notes, update_note},
    },
    state::AppState,
};

/// Builds the router. `static_dir` must contain `index.html`, which is
/// served at `/`; everything in it is served under `/static`.
pub fn app(state: Arc<AppState>, static_dir: &Path) -> Router {
    let notes = Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", put(update_note).delete(delete_note))
        .layer(Extension(state));

    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .merge(notes)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}

/// Any origin may call the API.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Turns a panic inside a handler into a 500 carrying the panic message.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "Internal server error".to_owned()
    };

    error!("request handler panicked: {}", message);

    let body = Json(ErrorResponse { error: message });

    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
