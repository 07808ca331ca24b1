//! Error types for the advisor.
//!
//! None of these cross the analysis/execution API: the engine folds them into
//! `RefactoringPlan::refusal_reason`, `RefactoringPlan::detector_failures` or
//! `RefactoringResult::errors`. Only configuration problems surface to the
//! caller, as `ConfigError`.

use crate::core::RuleId;
use std::path::PathBuf;
use thiserror::Error;

/// The source text does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

/// A single detector failed; the remaining detectors still run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    #[error("detector {rule} panicked: {message}")]
    Panicked { rule: RuleId, message: String },

    #[error("detector {rule} produced an invalid issue at line {line}: {reason}")]
    InvalidIssue {
        rule: RuleId,
        line: usize,
        reason: String,
    },
}

impl DetectorError {
    pub fn rule(&self) -> RuleId {
        match self {
            Self::Panicked { rule, .. } | Self::InvalidIssue { rule, .. } => *rule,
        }
    }
}

/// Reasons one execution attempt fails. Fatal to that attempt only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("source does not match the analysed plan (expected digest {expected}, got {actual})")]
    SourceMismatch { expected: String, actual: String },

    #[error("source failed pre-execution validation: {0}")]
    PreValidation(SyntaxError),

    #[error("plan is marked NEEDS REVIEW; live execution requires an explicit review override")]
    ReviewRequired,

    #[error("overlapping fixes at lines {first_start}-{first_end} and {second_start}-{second_end}")]
    OverlappingFixes {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("fix span {start}-{end} lies outside the source ({lines} lines)")]
    SpanOutOfRange {
        start: usize,
        end: usize,
        lines: usize,
    },

    #[error("refactored code failed validation, changes rolled back: {0}")]
    ValidationFailure(SyntaxError),

    #[error("execution panicked: {0}")]
    Panicked(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unknown rule '{0}' in configuration")]
    UnknownRule(String),

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
