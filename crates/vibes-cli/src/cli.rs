//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, ColorChoice, Parser, Subcommand, ValueHint};
use tracing::{debug, warn};
use vibes_common_config::{env, ConfigLoader, VibesConfig};
use vibes_docs::{ReferenceChecker, TocUpdater};
use vibes_hooks::{ConventionRuleSet, RuleSource};

use crate::commands::{DocCommand, HookCommand, MenuCommand};
use crate::error::CliError;

/// vibes - document TOC maintenance and file-convention hooks
#[derive(Debug, Parser)]
#[command(
    name = "vibes",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "VIBES_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// When to use terminal colors
    #[arg(long, global = true, default_value = "auto", value_enum)]
    pub color: ColorChoice,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Maintain document TOCs, the index and templates
    #[command(subcommand)]
    Doc(DocCommand),

    /// Check conventions and manage editor hooks
    #[command(subcommand)]
    Hook(HookCommand),

    /// Interactive menu
    Menu(MenuCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsCommand),
}

/// Shell completions generation
#[derive(Debug, Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl CompletionsCommand {
    pub fn execute(&self) -> Result<(), CliError> {
        use clap::CommandFactory;

        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}

impl Cli {
    /// Project root: `VIBES_PROJECT_ROOT`, then `CLAUDE_PROJECT_DIR`, then the
    /// nearest ancestor holding `.vibes` or `.git`, then the working directory.
    pub fn project_root(&self) -> Result<PathBuf, CliError> {
        let cwd = std::env::current_dir()?;
        if let Some(root) = env::get(env::vars::VIBES_PROJECT_ROOT)
            .or_else(|| env::get(env::vars::CLAUDE_PROJECT_DIR))
        {
            return Ok(vibes_common_fs::path::resolve(&cwd, root));
        }
        Ok(vibes_common_fs::path::find_project_root(&cwd).unwrap_or(cwd))
    }

    /// Whether this invocation is `hook run`, which must always exit 0.
    pub fn is_hook_run(&self) -> bool {
        matches!(self.command, Command::Hook(HookCommand::Run { .. }))
    }

    /// Resolve the project root and load its configuration.
    pub fn context(&self) -> Result<CommandContext, CliError> {
        let project_root = self.project_root()?;
        let mut loader = ConfigLoader::new(&project_root);
        if let Some(path) = &self.config {
            let cwd = std::env::current_dir()?;
            loader = loader.with_file(vibes_common_fs::path::resolve(&cwd, path));
        }
        let config = match loader.load() {
            Ok(config) => config,
            // `hook run` must exit 0 even with a broken config.
            Err(e) if self.is_hook_run() => {
                warn!(error = %e, "configuration unreadable, using defaults");
                VibesConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        debug!(root = %project_root.display(), config = %loader.config_path().display(), "configuration loaded");

        Ok(CommandContext {
            config,
            project_root,
            format: self.format,
            color: self.color,
            verbose: self.verbose,
            quiet: self.quiet,
        })
    }

    /// Execute the selected command
    pub fn execute(self, ctx: &CommandContext) -> Result<ExitCode, CliError> {
        match self.command {
            Command::Doc(cmd) => cmd.execute(ctx),
            Command::Hook(cmd) => cmd.execute(ctx),
            Command::Menu(cmd) => cmd.execute(ctx),
            Command::Completions(cmd) => {
                cmd.execute()?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: VibesConfig,
    pub project_root: PathBuf,
    pub format: OutputFormat,
    pub color: ColorChoice,
    pub verbose: u8,
    pub quiet: bool,
}

impl CommandContext {
    /// Context with default configuration rooted at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            config: VibesConfig::default(),
            project_root: project_root.into(),
            format: OutputFormat::Text,
            color: ColorChoice::Never,
            verbose: 0,
            quiet: false,
        }
    }

    pub fn doc_root(&self) -> PathBuf {
        self.config.doc_root(&self.project_root)
    }

    pub fn updater(&self) -> TocUpdater {
        TocUpdater::new(self.config.document.clone())
    }

    pub fn reference_checker(&self) -> ReferenceChecker {
        ReferenceChecker::new(self.config.document.clone(), self.doc_root())
    }

    /// The convention rules, empty when the rule file is missing or broken.
    pub fn rule_set(&self) -> ConventionRuleSet {
        ConventionRuleSet::load(RuleSource::File(self.config.rules_file(&self.project_root)))
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match std::env::current_dir() {
            Ok(cwd) => vibes_common_fs::path::resolve(cwd, path),
            Err(_) => vibes_common_fs::path::resolve(&self.project_root, path),
        }
    }
}
