//! Response tracking for the access log.
//!
//! [`ResponseTracker`] records the status code and the number of body bytes
//! that actually went out for one request. [`TrackedBody`] is the decorator
//! that feeds it: it wraps the response body, forwards every frame unchanged
//! and immediately, and counts data bytes as they are polled.
//!
//! The access entry is emitted once, when the tracked body is dropped. By
//! then hyper has either finished writing the body or given up on the
//! connection, so `bytes` reflects what was really handed to the transport.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use tracing::{error, info, warn};

/// Per-request record of what was written to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseTracker {
    status: StatusCode,
    bytes_written: u64,
}

impl Default for ResponseTracker {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            bytes_written: 0,
        }
    }
}

impl ResponseTracker {
    /// Create a tracker with the default `200 OK` status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the status that was sent.
    pub fn record_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Record `len` body bytes written.
    pub fn record_write(&mut self, len: usize) {
        self.bytes_written += len as u64;
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Request metadata captured before the downstream handler runs.
#[derive(Debug, Clone)]
pub struct AccessEntry {
    method: Method,
    path: String,
    user_agent: String,
    started: Instant,
    tracker: ResponseTracker,
}

impl AccessEntry {
    /// Start timing a request.
    pub fn start<B>(request: &Request<B>) -> Self {
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            user_agent,
            started: Instant::now(),
            tracker: ResponseTracker::new(),
        }
    }

    pub fn tracker(&self) -> &ResponseTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ResponseTracker {
        &mut self.tracker
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Emit the access log line.
    ///
    /// Level follows the status class: server errors at `error`, client
    /// errors at `warn`, everything else at `info`.
    pub fn emit(&self) {
        let method = &self.method;
        let path = &self.path;
        let user_agent = &self.user_agent;
        let status = self.tracker.status();
        let status_text = status.canonical_reason().unwrap_or("");
        let duration = self.elapsed();
        let bytes = self.tracker.bytes_written();

        macro_rules! access {
            ($level:ident) => {
                $level!(
                    target: "video_server::access",
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    status_text = status_text,
                    duration_ms = duration.as_secs_f64() * 1000.0,
                    bytes = bytes,
                    user_agent = %user_agent,
                    "[HTTP] {} {} {} {} {:?} {} bytes {}",
                    method,
                    path,
                    status_text,
                    status.as_u16(),
                    duration,
                    bytes,
                    user_agent
                )
            };
        }

        if status.is_server_error() {
            access!(error);
        } else if status.is_client_error() {
            access!(warn);
        } else {
            access!(info);
        }
    }
}

/// Response body that counts bytes and logs the request when dropped.
pub struct TrackedBody {
    inner: Body,
    entry: AccessEntry,
}

impl TrackedBody {
    /// Wrap `inner`, recording `status` as the response status.
    pub fn new(inner: Body, mut entry: AccessEntry, status: StatusCode) -> Self {
        entry.tracker_mut().record_status(status);
        Self { inner, entry }
    }
}

impl HttpBody for TrackedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_frame(cx);

        if let Poll::Ready(Some(Ok(frame))) = &poll {
            if let Some(data) = frame.data_ref() {
                this.entry.tracker_mut().record_write(data.len());
            }
        }

        poll
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.entry.emit();
    }
}
