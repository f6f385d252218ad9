//! Diagnostic sinks
//!
//! `TracingSink` forwards to `tracing` under the `hostbind` target;
//! `MemorySink` keeps diagnostics for hosts that show them in a console,
//! and for tests.

use hostbind_sdk::{BindError, Diagnostic, DiagnosticSink, Severity};
use parking_lot::Mutex;

use crate::defaults::LOG_TARGET;

/// Sink that logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => tracing::info!(target: LOG_TARGET, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(target: LOG_TARGET, "{}", diagnostic.message),
            Severity::Error => tracing::error!(target: LOG_TARGET, "{}", diagnostic.message),
        }
    }
}

/// Sink that collects diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Drain everything reported so far
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of diagnostics reported
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing was reported
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of diagnostics at `severity`
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}

/// Report `err` once as an error diagnostic and hand it back
pub(crate) fn fail<T>(sink: &dyn DiagnosticSink, err: BindError) -> Result<T, BindError> {
    sink.report(Diagnostic::error(err.to_string()));
    Err(err)
}
