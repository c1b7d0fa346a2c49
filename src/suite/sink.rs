//! Error channel: the single notification point for suite operation failures.
//!
//! Listeners are injected at construction. A non-fatal error with no listener
//! attached is escalated to the caller; a fatal error is always returned to the
//! caller after listeners have been notified.

use crate::error::SuiteError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{error, warn};

/// Receives errors published by suite operators.
pub trait ErrorSink: Send + Sync {
    fn report(&self, sender: &str, error: &SuiteError, fatal: bool);
}

/// Fan-out of error sinks.
#[derive(Clone, Default)]
pub struct ErrorChannel {
    listeners: Vec<Arc<dyn ErrorSink>>,
}

impl fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ErrorChannel {
    /// A channel with no listeners: every reported error escalates.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(sink: Arc<dyn ErrorSink>) -> Self {
        let mut channel = Self::new();
        channel.subscribe(sink);
        channel
    }

    pub fn subscribe(&mut self, sink: Arc<dyn ErrorSink>) {
        self.listeners.push(sink);
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Publish a non-fatal error.
    ///
    /// Returns `Err` only when nobody is listening.
    pub fn emit(&self, sender: &str, err: SuiteError) -> Result<(), SuiteError> {
        if self.listeners.is_empty() {
            warn!(sender, error = %err, "Unhandled suite error, escalating");
            return Err(err);
        }
        for listener in &self.listeners {
            listener.report(sender, &err, false);
        }
        Ok(())
    }

    /// Publish a fatal error and hand it back for the caller to return.
    pub fn fatal(&self, sender: &str, err: SuiteError) -> SuiteError {
        error!(sender, error = %err, "Fatal suite error");
        for listener in &self.listeners {
            listener.report(sender, &err, true);
        }
        err
    }
}

/// Logs reported errors through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, sender: &str, err: &SuiteError, fatal: bool) {
        if fatal {
            error!(sender, error = %err, "Suite error");
        } else {
            warn!(sender, error = %err, "Suite error");
        }
    }
}

/// A reported error as captured by [`CollectingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub sender: String,
    pub error: SuiteError,
    pub fatal: bool,
}

/// Keeps every reported error in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reported: Mutex<Vec<ReportedError>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reported(&self) -> Vec<ReportedError> {
        self.reported.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reported.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.lock().is_empty()
    }

    /// Drain and return everything reported so far.
    pub fn take(&self) -> Vec<ReportedError> {
        std::mem::take(&mut *self.reported.lock())
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, sender: &str, err: &SuiteError, fatal: bool) {
        self.reported.lock().push(ReportedError {
            sender: sender.to_string(),
            error: err.clone(),
            fatal,
        });
    }
}
