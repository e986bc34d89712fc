//! Log subscriber installation.
//!
//! Library crates log through the `log` facade; the fmt subscriber bridges
//! those records so a single filter governs both. Output goes to stderr so
//! stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

use crate::CliError;

/// Default filter when neither `RUST_LOG` nor `--log-level` is set.
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the filter, preferring `RUST_LOG` over the configured level.
pub(crate) fn filter(level: &str) -> Result<EnvFilter, CliError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(level).map_err(|source| CliError::LogFilter {
            value: level.to_owned(),
            source,
        })
    })
}

/// Install the global subscriber.
///
/// A subscriber installed earlier in the process is kept.
pub(crate) fn init(level: &str) -> Result<(), CliError> {
    let filter = filter(level)?;
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .is_err()
    {
        tracing::debug!("log subscriber already installed");
    }
    Ok(())
}
