//! Test helpers: temporary workspaces and a stub-backed engine builder.

use camino::{Utf8Path, Utf8PathBuf};
use microscore_core::Coordinate;
use microscore_data::overpass::{OverpassElement, OverpassResponse};
use microscore_data::test_support::{Reply, StubGeocodeSource, StubOverpassTransport};
use microscore_data::{EngineConfig, MicroScoreEngine, Pacing};
use std::fs;
use tempfile::TempDir;

use crate::CliError;
use crate::score::{AddressScorer, ScoreEngineBuilder};

/// Geocoder query produced for [`KNOWN_ADDRESS`].
pub(super) const KNOWN_QUERY: &str = "Gorriti 450, Palermo, CABA, Argentina";
/// Address the stub geocoder resolves.
pub(super) const KNOWN_ADDRESS: &str = "Gorriti 450, Palermo";
/// Address the stub geocoder cannot resolve.
pub(super) const UNKNOWN_ADDRESS: &str = "Calle Inexistente 1";

pub(super) fn origin() -> Coordinate {
    Coordinate::new(-34.5889, -58.4301)
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write test file");
}

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

/// Builds an engine over in-memory providers: [`KNOWN_QUERY`] geocodes to
/// [`origin`] and a park sits about 55 metres north of it.
pub(super) struct StubEngineBuilder;

impl ScoreEngineBuilder for StubEngineBuilder {
    fn build(&self, config: &EngineConfig) -> Result<Box<dyn AddressScorer>, CliError> {
        let park = OverpassResponse::new(vec![OverpassElement::way(
            3,
            origin().latitude + 0.0005,
            origin().longitude,
        )]);
        let config = EngineConfig {
            retry_rounds: 1,
            pacing: Pacing::immediate(),
            ..config.clone()
        };
        Ok(Box::new(MicroScoreEngine::with_sources(
            StubGeocodeSource::new().with_match(KNOWN_QUERY, origin()),
            StubOverpassTransport::new().on_query("leisure", Reply::Elements(park)),
            &config,
        )))
    }
}
