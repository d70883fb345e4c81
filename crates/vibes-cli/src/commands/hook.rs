//! `vibes hook` subcommands.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Subcommand, ValueHint};
use serde::Serialize;
use vibes_hooks::{
    decide, Decision, DecisionKind, FsMarkerStore, HookEntry, HookEvent, HookInput, HookRunner,
    HookSettings, RuleSummary, ToolInput,
};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, IconContext, StatusOutput};

/// Check conventions and manage editor hooks
#[derive(Debug, Subcommand)]
pub enum HookCommand {
    /// Show which convention applies to a path
    Check {
        /// Path relative to the project root
        path: String,
    },

    /// List the convention rules
    Rules,

    /// Handle one hook invocation: JSON payload on stdin, response on stdout
    Run {
        /// Save each raw payload into this directory
        #[arg(long, value_hint = ValueHint::DirPath)]
        capture: Option<PathBuf>,
    },

    /// List registered hooks
    List {
        #[arg(long)]
        event: Option<HookEvent>,
        #[command(flatten)]
        target: SettingsTarget,
    },

    /// Register a hook command
    Add {
        #[arg(long)]
        event: HookEvent,
        /// Tool matcher, e.g. "Edit|Write"
        #[arg(long, default_value = "")]
        matcher: String,
        #[arg(long)]
        command: String,
        /// Timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        #[command(flatten)]
        target: SettingsTarget,
    },

    /// Remove a hook command
    Remove {
        #[arg(long)]
        event: HookEvent,
        #[arg(long, default_value = "")]
        matcher: String,
        #[arg(long)]
        command: String,
        #[command(flatten)]
        target: SettingsTarget,
    },

    /// Remove all hooks, or all hooks of one event
    Clear {
        #[arg(long)]
        event: Option<HookEvent>,
        #[command(flatten)]
        target: SettingsTarget,
    },

    /// Merge hooks from another settings file
    Import {
        #[arg(value_hint = ValueHint::FilePath)]
        source: PathBuf,
        #[command(flatten)]
        target: SettingsTarget,
    },
}

/// Which settings file to edit.
#[derive(Debug, Clone, Args)]
pub struct SettingsTarget {
    /// Use settings.local.json instead of settings.json
    #[arg(long)]
    pub local: bool,
}

impl SettingsTarget {
    fn settings(&self, ctx: &CommandContext) -> HookSettings {
        HookSettings::in_dir(&ctx.config.claude_dir(&ctx.project_root), self.local)
    }
}

impl HookCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<ExitCode, CliError> {
        match self {
            Self::Check { path } => check(ctx, path)?,
            Self::Rules => {
                let rules = ctx.rule_set();
                print_output(ctx, &RuleList(rules.list_all()))?;
            }
            Self::Run { capture } => return Ok(run(ctx, capture.clone())),
            Self::List { event, target } => {
                let hooks = target.settings(ctx).list(*event)?;
                print_output(ctx, &HookList(hooks))?;
            }
            Self::Add {
                event,
                matcher,
                command,
                timeout,
                target,
            } => {
                let settings = target.settings(ctx);
                let status = if settings.add(*event, matcher, command, *timeout)? {
                    StatusOutput::success(format!("Added {event} hook: {command}"))
                } else {
                    StatusOutput::warning(format!("Already registered: {command}"))
                };
                print_output(ctx, &status)?;
            }
            Self::Remove {
                event,
                matcher,
                command,
                target,
            } => {
                if !target.settings(ctx).remove(*event, matcher, command)? {
                    return Err(CliError::not_found("hook", format!("{event} {matcher} {command}")));
                }
                print_output(ctx, &StatusOutput::success(format!("Removed {event} hook: {command}")))?;
            }
            Self::Clear { event, target } => {
                let count = target.settings(ctx).clear(*event)?;
                print_output(ctx, &StatusOutput::success(format!("Removed {count} hooks")))?;
            }
            Self::Import { source, target } => {
                let count = target.settings(ctx).import(&ctx.resolve(source))?;
                print_output(ctx, &StatusOutput::success(format!("Imported {count} hooks")))?;
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckOutput {
    path: String,
    #[serde(flatten)]
    decision: Decision,
}

impl FormattedOutput for CheckOutput {
    fn format_text(&self, icons: &IconContext) -> String {
        match self.decision.kind {
            DecisionKind::Allow => format!("{} {}: no convention applies", icons.check(), self.path),
            DecisionKind::Warn => format!("{} {}\n{}", icons.warning(), self.path, self.decision.reason),
            DecisionKind::Block => format!("{} {}\n{}", icons.cross(), self.path, self.decision.reason),
        }
    }

    fn format_quiet(&self) -> Option<String> {
        self.decision.rule_name.clone()
    }
}

fn check(ctx: &CommandContext, path: &str) -> Result<(), CliError> {
    print_output(ctx, &check_path(ctx, path))
}

/// Decide for a path as if it were the target of an edit.
pub(crate) fn check_path(ctx: &CommandContext, path: &str) -> CheckOutput {
    let rules = ctx.rule_set();
    let mut input = HookInput {
        tool_input: ToolInput {
            file_path: Some(path.to_string()),
            ..ToolInput::default()
        },
        ..HookInput::default()
    };
    input.relativize(&ctx.project_root);

    let decision = decide(&input, &rules);
    CheckOutput {
        path: input.file_path().unwrap_or(path).to_string(),
        decision,
    }
}

fn run(ctx: &CommandContext, capture: Option<PathBuf>) -> ExitCode {
    let mut store = FsMarkerStore::new(ctx.config.marker_dir(&ctx.project_root));
    if let Some(dir) = capture {
        store = store.with_capture(ctx.resolve(&dir));
    }

    let runner = HookRunner::new(ctx.rule_set(), store)
        .with_project_root(&ctx.project_root)
        .with_threshold(ctx.config.conventions.valid_until_token_increase);

    let code = runner.run(io::stdin().lock(), io::stdout().lock());
    let _ = io::stdout().flush();
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub(crate) struct RuleList(pub(crate) Vec<RuleSummary>);

impl FormattedOutput for RuleList {
    fn format_text(&self, icons: &IconContext) -> String {
        if self.0.is_empty() {
            return "No convention rules".to_string();
        }
        self.0
            .iter()
            .map(|rule| {
                format!(
                    "{} {} [{}]\n    patterns: {}\n    doc: {}",
                    icons.bullet(),
                    rule.name,
                    rule.severity,
                    rule.patterns.join(", "),
                    rule.convention_doc
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_quiet(&self) -> Option<String> {
        Some(format!("{} rules", self.0.len()))
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub(crate) struct HookList(pub(crate) Vec<HookEntry>);

impl FormattedOutput for HookList {
    fn format_text(&self, icons: &IconContext) -> String {
        if self.0.is_empty() {
            return "No hooks registered".to_string();
        }
        self.0
            .iter()
            .map(|hook| {
                let matcher = if hook.matcher.is_empty() { "*" } else { &hook.matcher };
                let timeout = hook.timeout.map(|t| format!(" (timeout {t}s)")).unwrap_or_default();
                format!("{} {} [{matcher}] {}{timeout}", icons.bullet(), hook.event, hook.command)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_quiet(&self) -> Option<String> {
        Some(format!("{} hooks", self.0.len()))
    }
}
