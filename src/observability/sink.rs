use super::{Diagnostic, DiagnosticLevel, DiagnosticSink};
use std::sync::Mutex;

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        let phase = diagnostic.phase.to_string();
        let source = diagnostic.source_id.as_deref().unwrap_or("<unnamed>");
        match diagnostic.level {
            DiagnosticLevel::Debug => {
                tracing::debug!(phase = %phase, source = %source, "{}", diagnostic.message)
            }
            DiagnosticLevel::Info => {
                tracing::info!(phase = %phase, source = %source, "{}", diagnostic.message)
            }
            DiagnosticLevel::Warn => {
                tracing::warn!(phase = %phase, source = %source, "{}", diagnostic.message)
            }
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::AnalysisPhase;

    #[test]
    fn test_collecting_sink_keeps_order_and_drains() {
        let sink = CollectingSink::default();
        sink.record(Diagnostic::new(
            AnalysisPhase::Parsing,
            DiagnosticLevel::Debug,
            Some("a.py"),
            "first",
        ));
        sink.record(Diagnostic::new(
            AnalysisPhase::Planning,
            DiagnosticLevel::Info,
            None,
            "second",
        ));

        let events = sink.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "first");
        assert_eq!(events[0].source_id.as_deref(), Some("a.py"));
        assert!(sink.diagnostics().is_empty());
    }
}
