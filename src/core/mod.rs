pub mod ast;
pub mod types;

pub use ast::{validate, SyntaxTree};
pub use types::{
    Category, Complexity, Confidence, DetectorFailure, Issue, LineSpan, PlanState,
    RefactoringPlan, RefactoringResult, RuleId, Severity, SourceUnit,
};

/// Hex xxh64 digest of a source text.
pub fn source_digest(source: &str) -> String {
    format!("{:016x}", xxhash_rust::xxh64::xxh64(source.as_bytes(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_digest_is_stable_and_distinguishes_text() {
        assert_eq!(source_digest("x = 1\n"), source_digest("x = 1\n"));
        assert_ne!(source_digest("x = 1\n"), source_digest("x = 2\n"));
        assert_eq!(source_digest("").len(), 16);
    }
}
