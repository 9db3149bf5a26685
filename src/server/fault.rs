//! Panic capture for the recovery middleware.
//!
//! By the time `catch_unwind` returns, the frames that panicked are gone, so
//! a backtrace taken there only shows the catch site. Instead a process-wide
//! panic hook records location and backtrace into thread-local storage while
//! a request is being polled inside a [`Guarded`] scope. The recovery
//! middleware picks the report up with [`take_fault`] on the same thread,
//! right after the unwind is caught.
//!
//! Panics outside a guarded scope go to whatever hook was installed before.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic;
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_FAULT: RefCell<Option<FaultReport>> = const { RefCell::new(None) };
}

/// What the panic hook saw for a guarded panic.
#[derive(Debug, Clone)]
pub struct FaultReport {
    /// `file:line:column` of the panic, when known
    pub location: Option<String>,

    /// Rendered backtrace taken inside the panicking frames
    pub backtrace: String,
}

/// Install the recording panic hook. Safe to call more than once.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }

            let report = FaultReport {
                location: info.location().map(|l| l.to_string()),
                backtrace: Backtrace::force_capture().to_string(),
            };
            LAST_FAULT.with(|slot| *slot.borrow_mut() = Some(report));
        }));
    });
}

/// Take the report recorded for the most recent guarded panic on this thread.
pub fn take_fault() -> Option<FaultReport> {
    LAST_FAULT.with(|slot| slot.borrow_mut().take())
}

/// Render a panic payload the way `std` prints it.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Marks the current thread as inside a guarded scope until dropped.
struct ScopeGuard;

impl ScopeGuard {
    fn enter() -> Self {
        GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
        ScopeGuard
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        GUARD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Future wrapper that polls its inner future inside a guarded scope.
///
/// The scope is entered for the duration of each `poll`, so it follows the
/// future across worker threads.
pub struct Guarded<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Guarded<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }
}

impl<F: Future> Future for Guarded<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _scope = ScopeGuard::enter();
        self.inner.as_mut().poll(cx)
    }
}
