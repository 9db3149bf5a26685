//! Router configuration for the video server.
//!
//! This module defines the HTTP routes and wraps them in the middleware
//! chain.
//!
//! # Route Structure
//!
//! ```text
//! /healthz              - Health check
//! /video/{path...}      - Segment and manifest files under the root
//! ```
//!
//! # Example
//!
//! ```ignore
//! use video_server::server::routes::{create_router, RouterConfig};
//!
//! let router = create_router(RouterConfig::new("/app/output"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8095").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::path::PathBuf;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, not_found_handler, video_handler, video_root_handler, AppState,
};
use super::middleware::{chain, ALL_MIDDLEWARES};

/// Default directory video files are served from.
pub const DEFAULT_ROOT: &str = "/app/output";

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Directory video paths are resolved against
    pub root: PathBuf,

    /// Whether to add `tower_http` request spans
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a configuration serving files under `root`.
    ///
    /// Tracing is enabled by default.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            enable_tracing: true,
        }
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Routes are registered first, then wrapped in [`ALL_MIDDLEWARES`]
/// (recovery, access log, CORS), so the chain also covers the fallback and
/// method-not-allowed responses.
pub fn create_router(config: RouterConfig) -> Router {
    let app_state = AppState::new(config.root);

    let router = Router::new()
        .route("/healthz", get(health_handler))
        .route("/video/", get(video_root_handler))
        .route("/video/{*path}", get(video_handler))
        .fallback(not_found_handler)
        .with_state(app_state);

    let router = chain(router, ALL_MIDDLEWARES);

    // Spans wrap the whole chain
    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
