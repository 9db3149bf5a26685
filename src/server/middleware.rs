//! Request middleware and the chain that composes it.
//!
//! A [`Middleware`] is a plain function from a request and the rest of the
//! stack ([`Next`]) to a boxed response future. [`chain`] layers an ordered
//! list of them onto a router so that the first entry sees the request first
//! and the response last:
//!
//! ```text
//! request ──▶ recover ──▶ access_log ──▶ cors ──▶ router ──▶ handler
//! response ◀── recover ◀── access_log ◀── cors ◀── router ◀──┘
//! ```
//!
//! [`ALL_MIDDLEWARES`] is the order the server runs with. Recovery must stay
//! outermost so that it catches faults from every inner layer.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    body::Body,
    extract::Request,
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    Router,
};
use futures_util::future::{BoxFuture, FutureExt};
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use tracing::error;

use super::fault::{install_panic_hook, panic_message, take_fault, Guarded};
use super::tracker::{AccessEntry, TrackedBody};

/// A request decorator.
pub type Middleware = fn(Request, Next) -> BoxFuture<'static, Response>;

/// Middleware the server runs with, outermost first.
pub const ALL_MIDDLEWARES: &[Middleware] = &[recover, access_log, cors];

/// Value of `Access-Control-Allow-Methods`.
pub const CORS_ALLOW_METHODS: &str = "GET, OPTIONS";

/// Value of `Access-Control-Allow-Headers`.
pub const CORS_ALLOW_HEADERS: &str = "Accept, Content-Type, Content-Length, Accept-Encoding";

/// Body of the response sent for a recovered fault.
pub const FAULT_BODY: &str = "Internal Server Error";

// =============================================================================
// Chain
// =============================================================================

/// Wrap `router` in `middlewares`, in listed order.
///
/// `Router::layer` makes the most recently added layer the outermost one,
/// so the list is applied back to front.
pub fn chain(router: Router, middlewares: &[Middleware]) -> Router {
    middlewares
        .iter()
        .rev()
        .fold(router, |router, middleware| router.layer(from_fn(*middleware)))
}

// =============================================================================
// Staged Headers
// =============================================================================

/// Headers that must survive a fault.
///
/// Recovery puts one of these into the request extensions before calling
/// down the stack. Middleware that sets unconditional response headers also
/// stages them here. If a fault later discards the real response, the
/// replacement response still carries them.
#[derive(Debug, Clone, Default)]
pub struct StagedHeaders(Arc<Mutex<HeaderMap>>);

impl StagedHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a header, replacing any previous value for `name`.
    pub fn insert(&self, name: HeaderName, value: HeaderValue) {
        self.lock().insert(name, value);
    }

    /// Copy staged headers onto `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.lock().iter() {
            headers.insert(name.clone(), value.clone());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeaderMap> {
        // a poisoned map is still a valid map
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Recovery
// =============================================================================

/// Convert a panic anywhere downstream into a `500 Internal Server Error`.
///
/// The fault is logged once, with its message, location and backtrace. A
/// panic raised while the body is already streaming happens outside this
/// scope and is not converted.
pub fn recover(mut request: Request, next: Next) -> BoxFuture<'static, Response> {
    install_panic_hook();

    let staged = StagedHeaders::new();
    request.extensions_mut().insert(staged.clone());

    async move {
        let outcome = AssertUnwindSafe(Guarded::new(next.run(request)))
            .catch_unwind()
            .await;

        match outcome {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let (location, backtrace) = match take_fault() {
                    Some(report) => (report.location, report.backtrace),
                    None => (None, std::backtrace::Backtrace::force_capture().to_string()),
                };

                error!(
                    panic = %message,
                    location = location.as_deref().unwrap_or("unknown"),
                    "caught a panic: {}, stack trace: {}",
                    message,
                    backtrace
                );

                let mut response =
                    (StatusCode::INTERNAL_SERVER_ERROR, FAULT_BODY).into_response();
                staged.apply(response.headers_mut());
                response.headers_mut().insert(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                );
                response
            }
        }
    }
    .boxed()
}

// =============================================================================
// Access Log
// =============================================================================

/// Log one line per request once its response has been sent.
///
/// The response body is wrapped in a [`TrackedBody`], which counts bytes as
/// they stream out and emits the entry when it is dropped. If the downstream
/// stack panics, the entry is emitted right away with status 500 and the
/// panic continues to the recovery layer.
pub fn access_log(request: Request, next: Next) -> BoxFuture<'static, Response> {
    let entry = AccessEntry::start(&request);

    async move {
        let outcome = AssertUnwindSafe(next.run(request)).catch_unwind().await;

        match outcome {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                let body = TrackedBody::new(body, entry, parts.status);
                Response::from_parts(parts, Body::new(body))
            }
            Err(payload) => {
                let mut entry = entry;
                entry
                    .tracker_mut()
                    .record_status(StatusCode::INTERNAL_SERVER_ERROR);
                entry.emit();
                std::panic::resume_unwind(payload)
            }
        }
    }
    .boxed()
}

// =============================================================================
// CORS
// =============================================================================

/// The CORS headers set on every response.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ),
    ]
}

/// Add CORS headers to every response and answer preflight requests.
///
/// `OPTIONS` requests get an empty `200 OK` without reaching the router.
pub fn cors(request: Request, next: Next) -> BoxFuture<'static, Response> {
    if let Some(staged) = request.extensions().get::<StagedHeaders>() {
        for (name, value) in cors_headers() {
            staged.insert(name, value);
        }
    }

    async move {
        let mut response = if *request.method() == Method::OPTIONS {
            StatusCode::OK.into_response()
        } else {
            next.run(request).await
        };

        for (name, value) in cors_headers() {
            response.headers_mut().insert(name, value);
        }
        response
    }
    .boxed()
}

// =============================================================================
// Tests
// =============================================================================
