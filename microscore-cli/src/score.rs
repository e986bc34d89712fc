//! Score command implementation.

use std::io::{BufWriter, Write};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use microscore_core::ScoreResult;
use microscore_data::geocode::GeocodeSource;
use microscore_data::overpass::OverpassTransport;
use microscore_data::{EngineConfig, HttpMicroScoreEngine, MicroScoreEngine};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::telemetry::{self, DEFAULT_LOG_LEVEL};
use crate::{
    ARG_INPUT, ARG_LOG_LEVEL, ARG_NOMINATIM_URL, ARG_OUTPUT, ARG_OVERPASS_ENDPOINT,
    ARG_RETRY_ROUNDS, ARG_SETTINGS, ARG_TIMEOUT_SECS, ARG_USER_AGENT, CliError, ENV_INPUT,
};

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Geocode each address, measure the distance to the nearest \
                 subway access, park, major road and rail line, and print one \
                 JSON record per address. Addresses come from positional \
                 arguments and/or an input file with one address per line.",
    about = "Score addresses"
)]
#[ortho_config(prefix = "MICROSCORE")]
pub(crate) struct ScoreArgs {
    /// Addresses to score.
    #[arg(value_name = "address")]
    #[serde(default)]
    pub(crate) addresses: Vec<String>,
    /// File with one address per line; blank lines and `#` comments are skipped.
    #[arg(long = ARG_INPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Write records to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// JSON file with engine settings (pacing, radii, locale, scoring).
    #[arg(long = ARG_SETTINGS, value_name = "path")]
    #[serde(default)]
    pub(crate) settings: Option<Utf8PathBuf>,
    /// Base URL of the Nominatim service.
    #[arg(long = ARG_NOMINATIM_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_url: Option<String>,
    /// Overpass interpreter endpoint; repeat to configure mirrors in order.
    #[arg(long = ARG_OVERPASS_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_endpoints: Vec<String>,
    /// User agent sent to both providers.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Retry rounds across all Overpass endpoints.
    #[arg(long = ARG_RETRY_ROUNDS, value_name = "rounds")]
    #[serde(default)]
    pub(crate) retry_rounds: Option<u32>,
    /// Log filter used when `RUST_LOG` is unset (e.g. "debug").
    #[arg(long = ARG_LOG_LEVEL, value_name = "filter")]
    #[serde(default)]
    pub(crate) log_level: Option<String>,
}

impl ScoreArgs {
    pub(crate) fn into_config(self) -> Result<ScoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ScoreConfig::try_from(merged)
    }
}

/// Engine settings given directly as options; each replaces the value from
/// the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EngineOverrides {
    pub(crate) nominatim_url: Option<String>,
    pub(crate) overpass_endpoints: Vec<String>,
    pub(crate) user_agent: Option<String>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) retry_rounds: Option<u32>,
}

impl EngineOverrides {
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(url) = &self.nominatim_url {
            config.nominatim_url.clone_from(url);
        }
        if !self.overpass_endpoints.is_empty() {
            config.overpass_endpoints.clone_from(&self.overpass_endpoints);
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent.clone_from(agent);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(rounds) = self.retry_rounds {
            config.retry_rounds = rounds;
        }
    }
}

/// Resolved `score` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoreConfig {
    pub(crate) addresses: Vec<String>,
    pub(crate) input: Option<Utf8PathBuf>,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) settings: Option<Utf8PathBuf>,
    pub(crate) overrides: EngineOverrides,
    pub(crate) log_level: String,
}

impl ScoreConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        if let Some(path) = &self.input {
            require_existing(path, ARG_INPUT)?;
        }
        if let Some(path) = &self.settings {
            require_existing(path, ARG_SETTINGS)?;
        }
        Ok(())
    }

    /// Positional addresses followed by those listed in the input file.
    pub(crate) fn collect_addresses(&self) -> Result<Vec<String>, CliError> {
        let mut addresses: Vec<String> = self
            .addresses
            .iter()
            .map(|address| address.trim())
            .filter(|address| !address.is_empty())
            .map(str::to_owned)
            .collect();
        if let Some(path) = &self.input {
            let listed = parse_address_list(&read_source(path, ARG_INPUT)?);
            if listed.is_empty() && addresses.is_empty() {
                return Err(CliError::EmptyAddressList { path: path.clone() });
            }
            addresses.extend(listed);
        }
        if addresses.is_empty() {
            return Err(CliError::NoAddresses { env: ENV_INPUT });
        }
        Ok(addresses)
    }

    /// Engine settings from the settings file, with option overrides applied.
    pub(crate) fn engine_config(&self) -> Result<EngineConfig, CliError> {
        let mut config = match &self.settings {
            Some(path) => load_settings(path)?,
            None => EngineConfig::default(),
        };
        self.overrides.apply(&mut config);
        Ok(config)
    }
}

impl TryFrom<ScoreArgs> for ScoreConfig {
    type Error = CliError;

    fn try_from(args: ScoreArgs) -> Result<Self, Self::Error> {
        if args.addresses.is_empty() && args.input.is_none() {
            return Err(CliError::NoAddresses { env: ENV_INPUT });
        }
        Ok(Self {
            addresses: args.addresses,
            input: args.input,
            output: args.output,
            settings: args.settings,
            overrides: EngineOverrides {
                nominatim_url: args.nominatim_url,
                overpass_endpoints: args.overpass_endpoints,
                user_agent: args.user_agent,
                timeout_secs: args.timeout_secs,
                retry_rounds: args.retry_rounds,
            },
            log_level: args
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
        })
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match microscore_fs::is_regular_file(path) {
        Ok(true) => Ok(()),
        Ok(false) if path.exists() => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn read_source(path: &Utf8Path, field: &'static str) -> Result<String, CliError> {
    microscore_fs::read_utf8(path).map_err(|source| CliError::ReadSource {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// Loads JSON-encoded [`EngineConfig`] settings; omitted fields keep defaults.
pub(crate) fn load_settings(path: &Utf8Path) -> Result<EngineConfig, CliError> {
    let text = read_source(path, ARG_SETTINGS)?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseSettings {
        path: path.to_path_buf(),
        source,
    })
}

/// One address per line; blank lines and lines starting with `#` are skipped.
pub(crate) fn parse_address_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

/// Scores one address at a time.
#[async_trait(?Send)]
pub(crate) trait AddressScorer {
    async fn score(&self, address: &str) -> ScoreResult;

    /// Distinct geocoder and spatial queries cached so far.
    fn cached_queries(&self) -> (usize, usize);
}

#[async_trait(?Send)]
impl<G: GeocodeSource, T: OverpassTransport> AddressScorer for MicroScoreEngine<G, T> {
    async fn score(&self, address: &str) -> ScoreResult {
        self.score_address(address).await
    }

    fn cached_queries(&self) -> (usize, usize) {
        (
            self.geocoder().cached_queries(),
            self.resolver().client().cached_queries(),
        )
    }
}

/// Builds the scorer for the current invocation.
pub(crate) trait ScoreEngineBuilder {
    fn build(&self, config: &EngineConfig) -> Result<Box<dyn AddressScorer>, CliError>;
}

pub(crate) struct HttpScoreEngineBuilder;

impl ScoreEngineBuilder for HttpScoreEngineBuilder {
    fn build(&self, config: &EngineConfig) -> Result<Box<dyn AddressScorer>, CliError> {
        Ok(Box::new(HttpMicroScoreEngine::from_config(config)?))
    }
}

/// Output record: the scored address followed by its result fields.
#[derive(Debug, Serialize)]
struct ScoredAddress<'a> {
    address: &'a str,
    #[serde(flatten)]
    result: &'a ScoreResult,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), CliError> {
    let config = resolve_score_config(args)?;
    telemetry::init(&config.log_level)?;
    write_scores(&config, &HttpScoreEngineBuilder).map(|_| ())
}

/// Score every address into `--output`, or stdout when none is given.
///
/// The output file is created only after the address list, the engine and
/// the runtime are ready, so a rejected run leaves no file behind.
pub(crate) fn write_scores(
    config: &ScoreConfig,
    builder: &dyn ScoreEngineBuilder,
) -> Result<usize, CliError> {
    let batch = ScoreBatch::prepare(config, builder)?;
    let Some(path) = &config.output else {
        let mut stdout = std::io::stdout().lock();
        return batch.score_into(&mut stdout);
    };
    let file = microscore_fs::create_utf8(path).map_err(|source| CliError::CreateOutput {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let scored = batch.score_into(&mut writer)?;
    writer.flush().map_err(CliError::WriteOutput)?;
    Ok(scored)
}

pub(crate) fn run_score_with(
    args: ScoreArgs,
    builder: &dyn ScoreEngineBuilder,
    writer: &mut dyn Write,
) -> Result<usize, CliError> {
    let config = resolve_score_config(args)?;
    ScoreBatch::prepare(&config, builder)?.score_into(writer)
}

fn resolve_score_config(args: ScoreArgs) -> Result<ScoreConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Addresses and the machinery to score them, assembled before any output.
struct ScoreBatch {
    addresses: Vec<String>,
    scorer: Box<dyn AddressScorer>,
    runtime: tokio::runtime::Runtime,
}

impl ScoreBatch {
    fn prepare(config: &ScoreConfig, builder: &dyn ScoreEngineBuilder) -> Result<Self, CliError> {
        let addresses = config.collect_addresses()?;
        let scorer = builder.build(&config.engine_config()?)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;
        Ok(Self {
            addresses,
            scorer,
            runtime,
        })
    }

    fn score_into(&self, writer: &mut dyn Write) -> Result<usize, CliError> {
        let mut resolved = 0_usize;
        self.runtime.block_on(async {
            for address in &self.addresses {
                let result = self.scorer.score(address).await;
                if result.is_resolved() {
                    resolved += 1;
                }
                write_record(writer, address, &result)?;
            }
            Ok::<(), CliError>(())
        })?;

        let (geocoded, spatial) = self.scorer.cached_queries();
        info!(
            addresses = self.addresses.len(),
            resolved, geocoded, spatial, "scoring finished"
        );
        Ok(self.addresses.len())
    }
}

fn write_record(writer: &mut dyn Write, address: &str, result: &ScoreResult) -> Result<(), CliError> {
    let record = ScoredAddress { address, result };
    let payload = serde_json::to_string(&record).map_err(CliError::SerialiseResult)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ScoreConfig, CliError> {
    let merged = ScoreArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ScoreConfig::try_from(merged)
}
