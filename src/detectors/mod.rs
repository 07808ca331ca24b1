//! Issue catalog: the registered detectors and their shared helpers.
//!
//! Each detector owns one rule and one category, walks the same parsed
//! tree, and never mutates it. The registry is built once and read-only
//! afterwards; registration order fixes the order of issues in a plan.

pub mod documentation;
pub mod error_handling;
pub mod helpers;
pub mod performance;
pub mod security;
pub mod type_safety;

use crate::core::{Category, Issue, RuleId, SyntaxTree};
use crate::errors::DetectorError;
use crate::refactoring::assessment::Policy;
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A single refactoring rule.
pub trait Detector: Send + Sync {
    fn rule(&self) -> RuleId;
    fn category(&self) -> Category;
    /// Severity and confidence assigned to every issue this detector emits.
    fn policy(&self) -> Policy;
    fn detect(&self, tree: &SyntaxTree) -> Result<Vec<Issue>, DetectorError>;
}

static REGISTRY: Lazy<Vec<Arc<dyn Detector>>> = Lazy::new(|| {
    vec![
        Arc::new(performance::StringConcatInLoopDetector),
        Arc::new(performance::NestedLoopDetector),
        Arc::new(documentation::MissingDocstringDetector),
        Arc::new(type_safety::MissingTypeAnnotationDetector),
        Arc::new(error_handling::BareExceptDetector),
        Arc::new(security::DynamicCodeExecutionDetector),
    ]
});

/// All registered detectors, in registration order.
pub fn registry() -> &'static [Arc<dyn Detector>] {
    &REGISTRY
}

/// Which rules an analysis runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSelection {
    enabled: Option<BTreeSet<RuleId>>,
    disabled: BTreeSet<RuleId>,
}

impl RuleSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(rules: impl IntoIterator<Item = RuleId>) -> Self {
        Self {
            enabled: Some(rules.into_iter().collect()),
            disabled: BTreeSet::new(),
        }
    }

    pub fn without(mut self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        self.disabled.extend(rules);
        self
    }

    pub fn allows(&self, rule: RuleId) -> bool {
        let enabled = self
            .enabled
            .as_ref()
            .is_none_or(|rules| rules.contains(&rule));
        enabled && !self.disabled.contains(&rule)
    }

    /// Registered detectors allowed by this selection, in registration order.
    pub fn detectors(&self) -> Vec<Arc<dyn Detector>> {
        registry()
            .iter()
            .filter(|detector| self.allows(detector.rule()))
            .cloned()
            .collect()
    }
}
