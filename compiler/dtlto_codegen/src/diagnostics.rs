//! Diagnostic routing for the session and its backends.
//!
//! Errors and warnings reach the host through one of:
//! - Tracing: `tracing` events under the `dtlto` target (default)
//! - Buffer: captured for inspection by tests and embedding hosts
//! - Callback: forwarded to a host-provided closure
//! - Silent: discarded
//!
//! The same handler receives diagnostics emitted by backends across the
//! plugin boundary, via its [`DiagnosticSink`] implementation.

use std::fmt;
use std::sync::Arc;

use dtlto_abi::DiagnosticSink;
use parking_lot::Mutex;

/// How serious a diagnostic is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Handler that captures diagnostics in memory.
#[derive(Default)]
pub struct BufferDiagnosticHandler {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl BufferDiagnosticHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, severity: Severity, message: &str) {
        self.entries.lock().push((severity, message.to_string()));
    }

    /// Everything captured so far, in emission order.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

type Callback = Box<dyn Fn(Severity, &str) + Send + Sync>;

/// Diagnostic handler using enum dispatch.
pub enum DiagnosticHandler {
    /// Emits `tracing` events (default).
    Tracing,
    /// Captures to memory.
    Buffer(BufferDiagnosticHandler),
    /// Forwards to a closure.
    Callback(Callback),
    /// Discards everything.
    Silent,
}

impl DiagnosticHandler {
    pub fn emit(&self, severity: Severity, message: &str) {
        match self {
            Self::Tracing => match severity {
                Severity::Error => tracing::error!(target: "dtlto", "{message}"),
                Severity::Warning => tracing::warn!(target: "dtlto", "{message}"),
            },
            Self::Buffer(h) => h.record(severity, message),
            Self::Callback(f) => f(severity, message),
            Self::Silent => {}
        }
    }

    pub fn error(&self, message: &str) {
        self.emit(Severity::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Severity::Warning, message);
    }

    /// Captured diagnostics; empty for handlers that don't capture.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        match self {
            Self::Buffer(h) => h.entries(),
            Self::Tracing | Self::Callback(_) | Self::Silent => Vec::new(),
        }
    }

    /// Captured messages of one severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m)
            .collect()
    }
}

impl fmt::Debug for DiagnosticHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Tracing => "Tracing",
            Self::Buffer(_) => "Buffer",
            Self::Callback(_) => "Callback",
            Self::Silent => "Silent",
        };
        write!(f, "DiagnosticHandler::{kind}")
    }
}

impl DiagnosticSink for DiagnosticHandler {
    fn emit_error(&self, message: &str) {
        self.error(message);
    }

    fn emit_warn(&self, message: &str) {
        self.warn(message);
    }
}

/// Diagnostic handler shared between the session and its backends.
pub type SharedDiagnostics = Arc<DiagnosticHandler>;

pub fn tracing_handler() -> SharedDiagnostics {
    Arc::new(DiagnosticHandler::Tracing)
}

pub fn buffer_handler() -> SharedDiagnostics {
    Arc::new(DiagnosticHandler::Buffer(BufferDiagnosticHandler::new()))
}

pub fn silent_handler() -> SharedDiagnostics {
    Arc::new(DiagnosticHandler::Silent)
}

pub fn callback_handler(f: impl Fn(Severity, &str) + Send + Sync + 'static) -> SharedDiagnostics {
    Arc::new(DiagnosticHandler::Callback(Box::new(f)))
}
