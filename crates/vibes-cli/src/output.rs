//! Output formatting utilities for CLI commands.

use std::env;
use std::io::Write;

use serde::Serialize;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Types that can be printed as text or JSON.
pub trait FormattedOutput: Serialize {
    fn format_text(&self, icons: &IconContext) -> String;

    /// One-line summary printed under `--quiet`; `None` prints nothing.
    fn format_quiet(&self) -> Option<String> {
        None
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Print formatted output to stdout
pub fn print_output<T: FormattedOutput>(ctx: &CommandContext, value: &T) -> Result<(), CliError> {
    write_output(ctx, value, std::io::stdout().lock())
}

/// Print formatted output to a writer
pub fn write_output<T, W>(ctx: &CommandContext, value: &T, mut writer: W) -> Result<(), CliError>
where
    T: FormattedOutput,
    W: Write,
{
    let output = match ctx.format {
        OutputFormat::Json => Some(value.format_json()?),
        OutputFormat::Text if ctx.quiet => value.format_quiet(),
        OutputFormat::Text => Some(value.format_text(&IconContext::new())),
    };

    if let Some(output) = output {
        writeln!(writer, "{output}")?;
    }
    Ok(())
}

/// Helper for success/error status outputs
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub status: &'static str,
    pub message: String,
}

impl StatusOutput {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: "warning",
            message: message.into(),
        }
    }
}

impl FormattedOutput for StatusOutput {
    fn format_text(&self, icons: &IconContext) -> String {
        match self.status {
            "success" => format!("{} {}", icons.check(), self.message),
            "warning" => format!("{} {}", icons.warning(), self.message),
            _ => format!("{}: {}", self.status, self.message),
        }
    }

    fn format_quiet(&self) -> Option<String> {
        Some(self.message.clone())
    }
}

/// Status icons
pub struct Icons;

impl Icons {
    pub const CHECK: &'static str = "✓";
    pub const CROSS: &'static str = "✗";
    pub const WARNING: &'static str = "⚠";
    pub const BULLET: &'static str = "•";

    pub const CHECK_ASCII: &'static str = "[ok]";
    pub const CROSS_ASCII: &'static str = "[err]";
    pub const WARNING_ASCII: &'static str = "[warn]";
    pub const BULLET_ASCII: &'static str = "*";
}

/// Picks unicode or ASCII icons for the current terminal.
pub struct IconContext {
    unicode: bool,
}

impl IconContext {
    pub fn new() -> Self {
        Self {
            unicode: detect_unicode_support(),
        }
    }

    pub fn ascii() -> Self {
        Self { unicode: false }
    }

    pub fn check(&self) -> &'static str {
        if self.unicode { Icons::CHECK } else { Icons::CHECK_ASCII }
    }

    pub fn cross(&self) -> &'static str {
        if self.unicode { Icons::CROSS } else { Icons::CROSS_ASCII }
    }

    pub fn warning(&self) -> &'static str {
        if self.unicode { Icons::WARNING } else { Icons::WARNING_ASCII }
    }

    pub fn bullet(&self) -> &'static str {
        if self.unicode { Icons::BULLET } else { Icons::BULLET_ASCII }
    }
}

impl Default for IconContext {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_unicode_support() -> bool {
    env::var("TERM")
        .map(|t| !t.contains("linux"))
        .unwrap_or(true)
        && env::var("LANG")
            .map(|l| l.to_uppercase().contains("UTF"))
            .unwrap_or(true)
}
