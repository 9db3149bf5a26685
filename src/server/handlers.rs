//! HTTP request handlers for the video server.
//!
//! # Endpoints
//!
//! - `GET /video/{path...}` - Serve a segment or manifest file
//! - `GET /healthz` - Liveness probe

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, error};

use super::resolve::resolve_under_root;
use crate::error::VideoError;
use crate::media::{content_type_for, extension_of, is_allowed_extension};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Directory every video path is resolved against
    pub root: Arc<PathBuf>,
}

impl AppState {
    /// Create state serving files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }
}

// =============================================================================
// Error Responses
// =============================================================================

/// Write a plain-text error response.
pub fn plain_error(status: StatusCode, message: &'static str) -> Response {
    let mut response = (status, message).into_response();
    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

/// Convert VideoError to HTTP response.
///
/// Bodies are short fixed strings; the detailed error only goes to the log.
impl IntoResponse for VideoError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            VideoError::NotFound(_) => (StatusCode::NOT_FOUND, "Video not found"),
            VideoError::InvalidFileType(_) => (StatusCode::BAD_REQUEST, "Invalid file type"),
            VideoError::MissingExtension(_) | VideoError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "Server error: {}", self);
        } else {
            debug!(status = status.as_u16(), "Client error: {}", self);
        }

        plain_error(status, message)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle video file requests.
///
/// # Endpoint
///
/// `GET /video/{path...}`
///
/// # Response
///
/// The file contents with `Content-Type` taken from the extension. Range and
/// conditional requests (`Range`, `If-Modified-Since`, ...) are honoured.
///
/// # Errors
///
/// - `400 Bad Request`: extension not on the allow-list
/// - `404 Not Found`: nothing at the resolved path, or a directory with a
///   video extension
/// - `500 Internal Server Error`: an existing path has no extension, or the
///   file could not be inspected
pub async fn video_handler(
    State(state): State<AppState>,
    Path(sub_path): Path<String>,
    request: Request,
) -> Result<Response, VideoError> {
    serve_video(&state, &sub_path, request).await
}

/// Handle `GET /video/`, which names the root directory itself.
pub async fn video_root_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, VideoError> {
    serve_video(&state, "", request).await
}

async fn serve_video(
    state: &AppState,
    sub_path: &str,
    request: Request,
) -> Result<Response, VideoError> {
    let file_path = resolve_under_root(&state.root, sub_path);

    let metadata = match tokio::fs::metadata(&file_path).await {
        Ok(metadata) => metadata,
        Err(err) => return Err(VideoError::from_metadata(err, file_path)),
    };

    let extension = extension_of(&file_path)
        .ok_or_else(|| VideoError::MissingExtension(file_path.clone()))?
        .to_string();

    // e.g. a directory named `dir.mp4`
    if !metadata.is_file() {
        return Err(VideoError::NotFound(file_path));
    }

    if !is_allowed_extension(&extension) {
        return Err(VideoError::InvalidFileType(extension));
    }

    debug!(path = %file_path.display(), "Serving video file");

    let response = match ServeFile::new(&file_path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let mut response = response.map(Body::new);

    // only 2xx responses carry media
    match content_type_for(&extension) {
        Some(content_type) if response.status().is_success() => {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        _ => {
            response.headers_mut().remove(header::CONTENT_TYPE);
        }
    }

    Ok(response)
}

/// Health check endpoint.
///
/// Returns `200 OK` with the body `OK`.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Fallback for routes that do not exist.
pub async fn not_found_handler() -> Response {
    plain_error(StatusCode::NOT_FOUND, "404 page not found")
}

// =============================================================================
// Tests
// =============================================================================
