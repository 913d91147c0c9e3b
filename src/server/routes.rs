//! HTTP routes for the sync server.
//!
//! | Route                      | Response                                  |
//! |----------------------------|-------------------------------------------|
//! | `GET /library.json`        | the persisted index, byte for byte        |
//! | `GET /track/:persistentID` | the audio file for that track             |
//!
//! Everything else, including other methods on these paths, is a 404. Failures
//! are not distinguished either: a missing file is also a 404.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodFilter, on},
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::model::Library;

/// Read-only state shared by all connections.
#[derive(Clone)]
pub struct AppState {
    /// Persistent ID → file path, from the library snapshot
    tracks: Arc<HashMap<String, PathBuf>>,
    index_file: Arc<PathBuf>,
}

impl AppState {
    pub fn new(library: &Library, index_file: PathBuf) -> Self {
        let mut tracks = HashMap::with_capacity(library.len());
        for track in &library.tracks {
            // First match wins, as with a linear search
            tracks
                .entry(track.persistent_id.clone())
                .or_insert_with(|| PathBuf::from(&track.path));
        }

        Self {
            tracks: Arc::new(tracks),
            index_file: Arc::new(index_file),
        }
    }
}

/// Build the sync router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/library.json",
            on(MethodFilter::GET, library_json)
                .head(not_found)
                .fallback(not_found),
        )
        .route(
            "/track/:persistent_id",
            on(MethodFilter::GET, track_file)
                .head(not_found)
                .fallback(not_found),
        )
        .fallback(not_found)
        .with_state(state)
}

/// GET /library.json
async fn library_json(State(state): State<AppState>) -> Response {
    tracing::debug!("Serving library index");
    serve_file(&state.index_file).await
}

/// GET /track/:persistent_id
async fn track_file(
    State(state): State<AppState>,
    Path(persistent_id): Path<String>,
) -> Response {
    match state.tracks.get(&persistent_id) {
        Some(path) => {
            tracing::debug!(id = %persistent_id, path = %path.display(), "Serving track");
            serve_file(path).await
        }
        None => {
            tracing::debug!(id = %persistent_id, "Unknown persistent ID");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Content type by file extension.
pub fn content_type(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "json" => "application/json",
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// Stream a file with its length and content type.
async fn serve_file(path: &std::path::Path) -> Response {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "File unavailable");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let len = match file.metadata().await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => {
            tracing::debug!(path = %path.display(), "Not a regular file");
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Failed to stat file");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(content_type(path))),
        (header::CONTENT_LENGTH, HeaderValue::from(len)),
    ];
    (headers, Body::from_stream(ReaderStream::new(file))).into_response()
}
