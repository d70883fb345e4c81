//! Interactive menu.
//!
//! Entries are an enum; the label is only used for display and the user
//! picks by number.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use vibes_docs::generator::CATEGORIES;
use vibes_hooks::HookSettings;

use super::doc::{check_references, generate_document};
use super::hook::{check_path, HookList, RuleList};
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{write_output, StatusOutput};

/// Interactive menu
#[derive(Debug, Parser)]
pub struct MenuCommand {}

/// Menu entries in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    UpdateAll,
    UpdateFile,
    RebuildIndex,
    GenerateDocument,
    CheckReferences,
    CheckAllReferences,
    ListRules,
    CheckPath,
    ListHooks,
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 10] = [
        Self::UpdateAll,
        Self::UpdateFile,
        Self::RebuildIndex,
        Self::GenerateDocument,
        Self::CheckReferences,
        Self::CheckAllReferences,
        Self::ListRules,
        Self::CheckPath,
        Self::ListHooks,
        Self::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpdateAll => "Update all TOCs",
            Self::UpdateFile => "Update one document",
            Self::RebuildIndex => "Rebuild the index",
            Self::GenerateDocument => "Generate a document from a template",
            Self::CheckReferences => "Check the links of one document",
            Self::CheckAllReferences => "Check the links of all documents",
            Self::ListRules => "List convention rules",
            Self::CheckPath => "Check a path against the conventions",
            Self::ListHooks => "List registered hooks",
            Self::Quit => "Quit",
        }
    }

    /// 1-based selection.
    pub fn from_selection(input: &str) -> Option<Self> {
        let index: usize = input.trim().parse().ok()?;
        Self::ALL.get(index.checked_sub(1)?).copied()
    }
}

impl MenuCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<ExitCode, CliError> {
        let stdin = io::stdin();
        run_menu(ctx, &mut stdin.lock(), &mut io::stdout().lock())?;
        Ok(ExitCode::SUCCESS)
    }
}

/// Drive the menu until `Quit` or end of input.
pub fn run_menu(ctx: &CommandContext, input: &mut impl BufRead, out: &mut impl Write) -> Result<(), CliError> {
    loop {
        writeln!(out)?;
        for (i, action) in MenuAction::ALL.iter().enumerate() {
            writeln!(out, "{:>2}. {}", i + 1, action.label())?;
        }

        let Some(line) = prompt(input, out, &format!("Select [1-{}]", MenuAction::ALL.len()))? else {
            return Ok(());
        };
        let Some(action) = MenuAction::from_selection(&line) else {
            writeln!(out, "Invalid selection: {}", line.trim())?;
            continue;
        };
        debug!(?action, "menu selection");

        match perform(ctx, action, input, out) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(e) => writeln!(out, "error: {e}")?,
        }
    }
}

/// Returns `false` when the menu should exit.
fn perform(
    ctx: &CommandContext,
    action: MenuAction,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    match action {
        MenuAction::UpdateAll => {
            let report = ctx.updater().update_all(&ctx.doc_root())?;
            write_output(ctx, &report, &mut *out)?;
        }
        MenuAction::UpdateFile => {
            let Some(path) = prompt(input, out, "Document path")? else {
                return Ok(false);
            };
            let path = ctx.resolve(Path::new(path.trim()));
            if !path.is_file() {
                return Err(CliError::not_found("file", path.display().to_string()));
            }
            write_output(ctx, &ctx.updater().update_file(&path), &mut *out)?;
        }
        MenuAction::RebuildIndex => {
            let path = ctx.updater().index_builder().write(&ctx.doc_root())?;
            write_output(ctx, &StatusOutput::success(format!("Rebuilt {}", path.display())), &mut *out)?;
        }
        MenuAction::GenerateDocument => {
            for (i, category) in CATEGORIES.iter().enumerate() {
                writeln!(out, "{:>2}. {category}", i + 1)?;
            }
            let Some(choice) = prompt(input, out, "Document type")? else {
                return Ok(false);
            };
            let category = choice
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| CATEGORIES.get(i.checked_sub(1)?))
                .ok_or_else(|| CliError::validation(format!("invalid document type: {}", choice.trim())))?;

            let Some(filename) = prompt(input, out, "File name")? else {
                return Ok(false);
            };
            let Some(title) = prompt(input, out, "Title (empty to keep placeholders)")? else {
                return Ok(false);
            };
            let title = Some(title.trim()).filter(|t| !t.is_empty());
            let generated = generate_document(ctx, category, filename.trim(), title)?;
            write_output(ctx, &generated, &mut *out)?;
        }
        MenuAction::CheckReferences => {
            let Some(path) = prompt(input, out, "Document path")? else {
                return Ok(false);
            };
            write_output(ctx, &check_references(ctx, Path::new(path.trim()))?, &mut *out)?;
        }
        MenuAction::CheckAllReferences => {
            let batch = ctx.reference_checker().check_all()?;
            write_output(ctx, &batch, &mut *out)?;
        }
        MenuAction::ListRules => {
            write_output(ctx, &RuleList(ctx.rule_set().list_all()), &mut *out)?;
        }
        MenuAction::CheckPath => {
            let Some(path) = prompt(input, out, "Path")? else {
                return Ok(false);
            };
            write_output(ctx, &check_path(ctx, path.trim()), &mut *out)?;
        }
        MenuAction::ListHooks => {
            let settings = HookSettings::in_dir(&ctx.config.claude_dir(&ctx.project_root), false);
            write_output(ctx, &HookList(settings.list(None)?), &mut *out)?;
        }
        MenuAction::Quit => return Ok(false),
    }
    Ok(true)
}

/// Print `label` and read one line. `None` at end of input.
fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> Result<Option<String>, CliError> {
    write!(out, "{label}: ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
