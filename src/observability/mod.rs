//! Diagnostics for the analysis pipeline.
//!
//! Analysis and execution never write to a process-wide logger. Every
//! diagnostic goes to a [`DiagnosticSink`] supplied by the caller, which keeps
//! the engine a pure function of its inputs. The binary plugs in
//! [`TracingSink`] and initialises `tracing-subscriber` via
//! [`init_tracing`]; tests use [`CollectingSink`].
//!
//! ## Usage
//!
//! ```ignore
//! use refactor_advisor::observability::{CollectingSink, init_tracing};
//!
//! init_tracing(1);
//! let sink = std::sync::Arc::new(CollectingSink::default());
//! let engine = refactor_advisor::Engine::default().with_sink(sink.clone());
//! ```

pub mod sink;
pub mod tracing;

pub use self::sink::{CollectingSink, NullSink, TracingSink};
pub use self::tracing::init_tracing;

use std::fmt;

/// Pipeline stages, used to tag diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisPhase {
    /// Parsing source text into a syntax tree
    Parsing,
    /// Running registered detectors
    Detection,
    /// Aggregating issues into a plan
    Planning,
    /// Dry-run or live execution of a plan
    Execution,
    /// Rendering reports and diffs
    Reporting,
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsing => write!(f, "parsing"),
            Self::Detection => write!(f, "detection"),
            Self::Planning => write!(f, "planning"),
            Self::Execution => write!(f, "execution"),
            Self::Reporting => write!(f, "reporting"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

/// One observability event emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: AnalysisPhase,
    pub level: DiagnosticLevel,
    pub source_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        phase: AnalysisPhase,
        level: DiagnosticLevel,
        source_id: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            level,
            source_id: source_id.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Receiver for engine diagnostics. Must tolerate concurrent calls.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}
