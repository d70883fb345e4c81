//! I/O shell around [`decide`](crate::decision::decide).

use crate::decision::{decide, Decision, RuleLookup};
use crate::input::{HookInput, HookResponse};
use crate::session::{context_tokens, SessionGate, DEFAULT_TOKEN_THRESHOLD};
use crate::store::{MarkerKey, MarkerStore};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Name used in marker files written by the convention hook.
pub const DEFAULT_HOOK_NAME: &str = "ConventionHook";

/// Runs one hook invocation: read the payload, decide, respond, mark.
pub struct HookRunner<R, S> {
    rules: R,
    store: S,
    hook_name: String,
    project_root: Option<PathBuf>,
    threshold: u64,
}

impl<R: RuleLookup, S: MarkerStore> HookRunner<R, S> {
    pub fn new(rules: R, store: S) -> Self {
        Self {
            rules,
            store,
            hook_name: DEFAULT_HOOK_NAME.to_string(),
            project_root: None,
            threshold: DEFAULT_TOKEN_THRESHOLD,
        }
    }

    pub fn with_hook_name(mut self, name: impl Into<String>) -> Self {
        self.hook_name = name.into();
        self
    }

    /// Root used to relativize absolute target paths.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_threshold(mut self, tokens: u64) -> Self {
        self.threshold = tokens;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decide for a parsed payload without any side effects.
    pub fn evaluate(&self, input: &HookInput) -> Decision {
        let mut input = input.clone();
        if let Some(root) = self.project_root.as_ref().or(input.cwd.as_ref()).cloned() {
            input.relativize(&root);
        }
        decide(&input, &self.rules)
    }

    /// Handle one invocation and return the process exit code.
    ///
    /// Malformed input is ignored with exit code 0; only a failed response
    /// write returns 1.
    pub fn run(&self, mut reader: impl Read, mut writer: impl Write) -> i32 {
        info!(hook = %self.hook_name, "hook started");

        let mut raw = String::new();
        if let Err(err) = reader.read_to_string(&mut raw) {
            error!(error = %err, "failed to read hook input");
            return 0;
        }
        if let Err(err) = self.store.record("hook_input", &raw) {
            warn!(error = %err, "failed to record hook input");
        }

        let Some(input) = HookInput::parse(&raw) else {
            debug!("no usable input, exiting");
            return 0;
        };

        let decision = self.evaluate(&input);
        if decision.is_allow() {
            debug!("no convention applies");
            return 0;
        }

        let gate = SessionGate::new(&self.store, self.threshold);
        let marker = match (input.session(), decision.rule_name.as_deref()) {
            (Some(session), Some(rule)) => Some(MarkerKey::rule(&self.hook_name, session, rule)),
            _ => None,
        };
        let current_tokens = input.transcript_path.as_deref().and_then(context_tokens);

        if let Some(key) = &marker {
            if gate.is_fresh(key, current_tokens) {
                debug!(rule = ?decision.rule_name, "already reported in this session");
                return 0;
            }
        }

        if let Err(err) = write_response(&mut writer, &HookResponse::from(&decision)) {
            error!(error = %err, "failed to write hook response");
            return 1;
        }

        if let Some(key) = &marker {
            gate.mark(key, current_tokens);
        }
        info!(decision = ?decision.kind, rule = ?decision.rule_name, "hook responded");
        0
    }
}

fn write_response(writer: &mut impl Write, response: &HookResponse) -> Result<(), crate::error::HookError> {
    let line = serde_json::to_string(response)?;
    writeln!(writer, "{line}")?;
    writer.flush()?;
    Ok(())
}
