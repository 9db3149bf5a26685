//! HTTP server layer for the video server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │            GET /video/{path...}      GET /healthz               │
//! │                                                                 │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │ middleware: recover ─▶ access_log ─▶ cors                │   │
//! │  │             (fault)    (tracker)                         │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │   resolve   │  │        routes           │  │
//! │  │ (requests)  │  │ (root join) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod fault;
pub mod handlers;
pub mod middleware;
pub mod resolve;
pub mod routes;
pub mod tracker;

pub use fault::{install_panic_hook, FaultReport};
pub use handlers::{health_handler, not_found_handler, video_handler, AppState};
pub use middleware::{access_log, chain, cors, recover, Middleware, StagedHeaders, ALL_MIDDLEWARES};
pub use resolve::resolve_under_root;
pub use routes::{create_router, RouterConfig, DEFAULT_ROOT};
pub use tracker::{AccessEntry, ResponseTracker, TrackedBody};
