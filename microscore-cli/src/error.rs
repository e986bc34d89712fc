//! Error types emitted by the micro-score CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use microscore_data::EngineBuildError;
use thiserror::Error;

/// Errors emitted by the micro-score CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// Neither positional addresses nor an input file were supplied.
    #[error("no addresses given (pass them as arguments, or set --input or {env})")]
    NoAddresses {
        /// Environment variable naming the input file.
        env: &'static str,
    },
    /// The input file held no addresses.
    #[error("input file {path:?} contains no addresses")]
    EmptyAddressList {
        /// Input file path.
        path: Utf8PathBuf,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Reading a referenced input file failed.
    #[error("failed to read {field} file {path:?}: {source}")]
    ReadSource {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Engine settings JSON could not be decoded.
    #[error("failed to parse engine settings JSON at {path:?}: {source}")]
    ParseSettings {
        /// Settings file path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The log filter could not be parsed.
    #[error("invalid log level/filter {value:?}: {source}")]
    LogFilter {
        /// Rejected filter.
        value: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    /// Constructing the engine failed.
    #[error(transparent)]
    BuildEngine(#[from] EngineBuildError),
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Creating the output file failed.
    #[error("failed to create output file {path:?}: {source}")]
    CreateOutput {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Serialising a score record failed.
    #[error("failed to serialise score record: {0}")]
    SerialiseResult(#[source] serde_json::Error),
    /// Writing score output failed.
    #[error("failed to write score output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
