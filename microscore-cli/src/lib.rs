//! Command-line interface scoring addresses with the micro-score engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod score;
mod telemetry;

pub use error::CliError;

use score::{ScoreArgs, run_score};

const ARG_INPUT: &str = "input";
const ARG_OUTPUT: &str = "output";
const ARG_SETTINGS: &str = "settings";
const ARG_NOMINATIM_URL: &str = "nominatim-url";
const ARG_OVERPASS_ENDPOINT: &str = "overpass-endpoint";
const ARG_USER_AGENT: &str = "user-agent";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_RETRY_ROUNDS: &str = "retry-rounds";
const ARG_LOG_LEVEL: &str = "log-level";
const ENV_INPUT: &str = "MICROSCORE_CMDS_SCORE_INPUT";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, when
/// inputs cannot be read, or when results cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Score(args) => run_score(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "microscore",
    about = "Score residential addresses by proximity to parks, transit and noise sources",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Geocode addresses and print one JSON score record per line.
    Score(ScoreArgs),
}

#[cfg(test)]
mod tests;
