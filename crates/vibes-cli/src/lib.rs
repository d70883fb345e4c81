//! Library side of the `vibes` CLI.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;
