//! Ordered convention rules with first-match-wins lookup.

use crate::error::ConventionError;
use crate::pattern::PatternSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// How strongly a convention is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Block,
    Warn,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Warn => "warn",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule as written in the rule specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionRule {
    pub name: String,
    pub patterns: Vec<String>,
    pub convention_doc: String,
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
}

/// Presentation of a matched rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchDescription {
    pub rule_name: String,
    pub severity: Severity,
    /// Text quoting both the rule message and the convention document.
    pub message: String,
    pub convention_doc: String,
}

/// Rule summary for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub name: String,
    pub patterns: Vec<String>,
    pub convention_doc: String,
    pub severity: Severity,
}

/// Where rules are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// A YAML (or JSON) file on disk.
    File(PathBuf),
    /// Rule text held in memory.
    Inline(String),
}

impl RuleSource {
    fn origin(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline(_) => "<inline>".to_string(),
        }
    }

    fn read(&self) -> Result<String, ConventionError> {
        match self {
            Self::File(path) => {
                vibes_common_fs::read_to_string(path, vibes_common_fs::DEFAULT_MAX_SIZE).map_err(|e| {
                    if e.is_not_found() {
                        ConventionError::NotFound(path.clone())
                    } else {
                        ConventionError::FileSystem(e)
                    }
                })
            }
            Self::Inline(text) => Ok(text.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<ConventionRule>,
}

#[derive(Debug)]
struct CompiledRule {
    rule: ConventionRule,
    patterns: PatternSet,
}

fn parse(source: &RuleSource) -> Result<Vec<CompiledRule>, ConventionError> {
    let text = source.read()?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let file: Option<RuleFile> =
        serde_yaml::from_str(&text).map_err(|e| ConventionError::Malformed {
            origin: source.origin(),
            message: e.to_string(),
        })?;

    file.unwrap_or_default()
        .rules
        .into_iter()
        .map(|rule| {
            let patterns = PatternSet::new(&rule.patterns).map_err(|(pattern, e)| {
                ConventionError::InvalidPattern {
                    rule: rule.name.clone(),
                    pattern,
                    message: e.to_string(),
                }
            })?;
            Ok(CompiledRule { rule, patterns })
        })
        .collect()
}

/// The active convention rules.
///
/// Lookups take a snapshot of the rule list, so a concurrent `reload` is seen
/// either entirely or not at all.
#[derive(Debug)]
pub struct ConventionRuleSet {
    source: RuleSource,
    rules: RwLock<Arc<Vec<CompiledRule>>>,
}

impl ConventionRuleSet {
    /// Load rules, degrading to an empty set when the source is missing or malformed.
    pub fn load(source: RuleSource) -> Self {
        let rules = match parse(&source) {
            Ok(rules) => rules,
            Err(err) => {
                warn!(source = %source.origin(), error = %err, "no convention rules loaded");
                Vec::new()
            }
        };
        Self::with_rules(source, rules)
    }

    /// Load rules, surfacing any error.
    pub fn try_load(source: RuleSource) -> Result<Self, ConventionError> {
        let rules = parse(&source)?;
        Ok(Self::with_rules(source, rules))
    }

    fn with_rules(source: RuleSource, rules: Vec<CompiledRule>) -> Self {
        debug!(source = %source.origin(), count = rules.len(), "convention rules loaded");
        Self {
            source,
            rules: RwLock::new(Arc::new(rules)),
        }
    }

    fn snapshot(&self) -> Arc<Vec<CompiledRule>> {
        Arc::clone(&self.rules.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Re-read the source and replace every rule.
    ///
    /// On failure the set becomes empty and the error is returned.
    pub fn reload(&self) -> Result<usize, ConventionError> {
        let (rules, result) = match parse(&self.source) {
            Ok(rules) => {
                let count = rules.len();
                (rules, Ok(count))
            }
            Err(err) => {
                warn!(source = %self.source.origin(), error = %err, "reload failed; rules cleared");
                (Vec::new(), Err(err))
            }
        };
        *self.rules.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(rules);
        result
    }

    /// First rule, in declaration order, with a pattern matching `path`.
    pub fn find_match(&self, path: &str) -> Option<ConventionRule> {
        self.snapshot()
            .iter()
            .find(|compiled| compiled.patterns.is_match(path))
            .map(|compiled| compiled.rule.clone())
    }

    pub fn describe_match(&self, path: &str) -> Option<MatchDescription> {
        self.find_match(path).map(|rule| describe(&rule))
    }

    pub fn list_all(&self) -> Vec<RuleSummary> {
        self.snapshot()
            .iter()
            .map(|compiled| RuleSummary {
                name: compiled.rule.name.clone(),
                patterns: compiled.rule.patterns.clone(),
                convention_doc: compiled.rule.convention_doc.clone(),
                severity: compiled.rule.severity,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

fn describe(rule: &ConventionRule) -> MatchDescription {
    let heading = match rule.severity {
        Severity::Block => "🚫 Convention check required",
        Severity::Warn => "⚠️ Convention reminder",
    };
    let message = format!(
        "{heading}: {name}\n\n{message}\n\nRead {doc} before editing this file.",
        name = rule.name,
        message = rule.message,
        doc = rule.convention_doc,
    );

    MatchDescription {
        rule_name: rule.name.clone(),
        severity: rule.severity,
        message,
        convention_doc: rule.convention_doc.clone(),
    }
}
