//! Hook payloads read from stdin and responses written to stdout.

use crate::decision::{Decision, DecisionKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Event name reported in every response.
pub const PRE_TOOL_USE: &str = "PreToolUse";

/// Tool arguments relevant to convention checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolInput {
    pub file_path: Option<String>,
    pub notebook_path: Option<String>,
    pub command: Option<String>,
}

/// The JSON object the editor sends to a hook command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HookInput {
    pub session_id: Option<String>,
    pub transcript_path: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    pub hook_event_name: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: ToolInput,
}

impl HookInput {
    /// Parse raw stdin. Empty or invalid input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(raw) {
            Ok(input) => Some(input),
            Err(err) => {
                warn!(error = %err, "ignoring invalid hook input");
                None
            }
        }
    }

    /// Target file of the tool call, if any.
    pub fn file_path(&self) -> Option<&str> {
        self.tool_input
            .file_path
            .as_deref()
            .or(self.tool_input.notebook_path.as_deref())
            .filter(|p| !p.is_empty())
    }

    /// Session id when present and non-empty.
    pub fn session(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Rewrite an absolute target path relative to `root` when it lies inside it.
    pub fn relativize(&mut self, root: &Path) {
        for slot in [&mut self.tool_input.file_path, &mut self.tool_input.notebook_path] {
            let relative = slot
                .as_deref()
                .and_then(|path| Path::new(path).strip_prefix(root).ok())
                .map(vibes_common_fs::path::to_unix_string);
            if relative.is_some() {
                *slot = relative;
            }
        }
    }
}

/// JSON line written back to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookResponse {
    pub decision: String,
    pub reason: String,
    pub hook_event_name: String,
    pub permission_decision: String,
    pub permission_decision_reason: String,
}

impl From<&Decision> for HookResponse {
    fn from(decision: &Decision) -> Self {
        let (verdict, permission) = match decision.kind {
            DecisionKind::Allow => ("approve", "allow"),
            DecisionKind::Warn => ("approve", "ask"),
            DecisionKind::Block => ("block", "deny"),
        };
        Self {
            decision: verdict.to_string(),
            reason: decision.reason.clone(),
            hook_event_name: PRE_TOOL_USE.to_string(),
            permission_decision: permission.to_string(),
            permission_decision_reason: decision.reason.clone(),
        }
    }
}
