//! File-convention enforcement for editor hooks.
//!
//! [`pattern`] matches paths, [`rules`] holds the ordered rule set,
//! [`decision`] turns a hook payload into a verdict, and [`runner`] wires the
//! verdict to stdin/stdout and the [`store`] of per-session markers.

pub mod decision;
pub mod error;
pub mod input;
pub mod pattern;
pub mod rules;
pub mod runner;
pub mod session;
pub mod settings;
pub mod store;

pub use decision::{decide, Decision, DecisionKind, RuleLookup};
pub use error::{ConventionError, HookError, SettingsError};
pub use input::{HookInput, HookResponse, ToolInput};
pub use pattern::PatternSet;
pub use rules::{ConventionRule, ConventionRuleSet, MatchDescription, RuleSource, RuleSummary, Severity};
pub use runner::HookRunner;
pub use session::{context_tokens, SessionGate};
pub use settings::{HookEntry, HookEvent, HookSettings};
pub use store::{FsMarkerStore, MarkerKey, MarkerStore, MemoryMarkerStore};
