//! Diagnostic sink
//!
//! Listener failures are reported here instead of surfacing to the host;
//! the default sink writes through tracing.

/// Receives diagnostic text from the dispatch path.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, text: &str);
}

/// Sink that forwards diagnostics to the tracing subscriber.
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, text: &str) {
        tracing::error!(target: "pawnbridge", "{text}");
    }
}
