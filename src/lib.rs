//! # Video Server
//!
//! A small HTTP server for pre-rendered video segments.
//!
//! An external packaging pipeline writes MP4, WebM, HLS (`.m3u8`/`.ts`) and
//! DASH (`.mpd`/`.m4s`) files into a directory tree. This crate serves that
//! tree read-only under `/video/`, with a `/healthz` liveness probe.
//!
//! ## Features
//!
//! - **Allow-listed extensions**: only segment and manifest types are served,
//!   each with its proper `Content-Type`
//! - **Traversal-safe paths**: request paths can never resolve outside the root
//! - **Byte serving**: `Range` and conditional requests via `tower_http`
//! - **Middleware chain**: panic recovery, access logging and CORS, applied in
//!   a fixed order
//!
//! ## Architecture
//!
//! - [`media`] - Extension allow-list and MIME table
//! - [`server`] - Axum router, handlers and middleware
//! - [`config`] - CLI and environment configuration
//! - [`error`] - Error types for the file handler
//!
//! ## Example
//!
//! ```rust,no_run
//! use video_server::{create_router, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = create_router(RouterConfig::new("/app/output"));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8095").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod server;

// Re-export commonly used types
pub use config::{Config, DEFAULT_HOST, DEFAULT_PORT};
pub use error::VideoError;
pub use media::{
    content_type_for, extension_of, is_allowed_extension, ALLOWED_EXTENSIONS, CONTENT_TYPES,
};
pub use server::{
    access_log, chain, cors, create_router, health_handler, install_panic_hook, recover,
    resolve_under_root, video_handler, AccessEntry, AppState, Middleware, ResponseTracker,
    RouterConfig, StagedHeaders, TrackedBody, ALL_MIDDLEWARES, DEFAULT_ROOT,
};
