//! Cooperative cancellation for the lexer and assembler.
//!
//! The core never spawns its own timers or threads; a [`Signal`] is polled at
//! token boundaries inside the lexer and at record boundaries inside the
//! assembler (§5). Once observed, the signal's [`CancelReason`] is carried
//! verbatim into [`crate::error::Error::Cancelled`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why a stream was cancelled.
///
/// Kept distinct from a caller-supplied free-form reason so that embedders
/// can tell a deadline from an explicit abort without string matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller explicitly requested cancellation, with an optional
    /// human-readable reason.
    Caller(Option<String>),
    /// A deadline elapsed.
    Timeout,
    /// `flush` already ran to completion; the pipeline is spent and every
    /// call except a repeat `flush` is terminal (§3 lifecycle).
    StreamSpent,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Caller(Some(reason)) => write!(f, "cancelled by caller: {reason}"),
            CancelReason::Caller(None) => write!(f, "cancelled by caller"),
            CancelReason::Timeout => write!(f, "timed out"),
            CancelReason::StreamSpent => write!(f, "pipeline already flushed"),
        }
    }
}

/// Polled at lexer token boundaries and assembler record boundaries.
///
/// Implementors must be cheap to poll; the core calls [`Signal::reason`] once
/// per token/record. A `None` return means "keep going".
pub trait Signal {
    /// Returns the cancellation reason if this signal has fired, or `None`
    /// if parsing should continue.
    fn reason(&self) -> Option<CancelReason>;
}

/// A `Signal` that is never triggered. This is the implicit default used
/// when no `signal` option is supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverSignal;

impl Signal for NeverSignal {
    fn reason(&self) -> Option<CancelReason> {
        None
    }
}

/// A [`Signal`] the caller can trigger from outside the lexer/assembler,
/// e.g. from another thread or a timer callback. Cloning shares the same
/// underlying flag.
#[derive(Debug, Clone, Default)]
pub struct ManualSignal {
    inner: Arc<ManualSignalState>,
}

#[derive(Debug, Default)]
struct ManualSignalState {
    fired: AtomicBool,
    timeout: AtomicBool,
    reason: std::sync::Mutex<Option<String>>,
}

impl ManualSignal {
    /// Creates a signal that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this signal as cancelled by the caller, with an optional reason.
    pub fn cancel(&self, reason: Option<String>) {
        if let Ok(mut guard) = self.inner.reason.lock() {
            *guard = reason;
        }
        self.inner.timeout.store(false, Ordering::SeqCst);
        self.inner.fired.store(true, Ordering::SeqCst);
    }

    /// Marks this signal as fired due to a timeout.
    pub fn time_out(&self) {
        self.inner.timeout.store(true, Ordering::SeqCst);
        self.inner.fired.store(true, Ordering::SeqCst);
    }
}

impl Signal for ManualSignal {
    fn reason(&self) -> Option<CancelReason> {
        if !self.inner.fired.load(Ordering::SeqCst) {
            return None;
        }
        if self.inner.timeout.load(Ordering::SeqCst) {
            return Some(CancelReason::Timeout);
        }
        let reason = self.inner.reason.lock().ok().and_then(|g| g.clone());
        Some(CancelReason::Caller(reason))
    }
}
