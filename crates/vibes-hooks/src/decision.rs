//! Pure hook decision logic.

use crate::input::HookInput;
use crate::rules::{ConventionRuleSet, MatchDescription, Severity};
use serde::Serialize;

/// Verdict for a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Allow,
    Warn,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub kind: DecisionKind,
    pub reason: String,
    /// Rule that produced a warn or block.
    pub rule_name: Option<String>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            kind: DecisionKind::Allow,
            reason: String::new(),
            rule_name: None,
        }
    }

    pub fn warn(rule_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: DecisionKind::Warn,
            reason: reason.into(),
            rule_name: Some(rule_name.into()),
        }
    }

    pub fn block(rule_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: DecisionKind::Block,
            reason: reason.into(),
            rule_name: Some(rule_name.into()),
        }
    }

    pub fn is_allow(&self) -> bool {
        self.kind == DecisionKind::Allow
    }
}

/// Anything that can describe the convention governing a path.
pub trait RuleLookup {
    fn describe(&self, path: &str) -> Option<MatchDescription>;
}

impl RuleLookup for ConventionRuleSet {
    fn describe(&self, path: &str) -> Option<MatchDescription> {
        self.describe_match(path)
    }
}

impl<T: RuleLookup + ?Sized> RuleLookup for &T {
    fn describe(&self, path: &str) -> Option<MatchDescription> {
        (**self).describe(path)
    }
}

/// Decide how to treat a tool call.
pub fn decide(input: &HookInput, rules: &impl RuleLookup) -> Decision {
    let Some(path) = input.file_path() else {
        return Decision::allow();
    };
    match rules.describe(path) {
        None => Decision::allow(),
        Some(found) => match found.severity {
            Severity::Block => Decision::block(found.rule_name, found.message),
            Severity::Warn => Decision::warn(found.rule_name, found.message),
        },
    }
}
