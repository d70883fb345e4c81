//! Entry point for the `vibes` binary.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use tracing::error;

use vibes_cli::cli::Cli;
use vibes_cli::error::CliError;
use vibes_common_log::{LogConfig, LogLevel};

fn main() -> ExitCode {
    vibes_common_config::env::load_dotenv();
    let cli = Cli::parse();

    init_logging(&cli);
    let hook_run = cli.is_hook_run();

    match run(cli) {
        Ok(code) => code,
        Err(e) if hook_run => {
            error!(code = e.code(), "hook run failed: {e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let ctx = cli.context()?;
    cli.execute(&ctx)
}

fn init_logging(cli: &Cli) {
    let ansi = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stderr().is_terminal(),
    };
    let mut config = LogConfig::from_env().with_ansi(ansi);
    if cli.verbose > 0 || cli.quiet {
        config = config.with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));
    }

    // A second init (tests, embedding) is harmless.
    let _ = vibes_common_log::init(config);
}
