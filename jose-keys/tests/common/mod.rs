use std::path::PathBuf;

use jose_keys::KeySource;
use simplelog::{Config, LevelFilter, TestLogger};

/// Returns the path of the fixture `name`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Returns the fixture `name` as [`KeySource`].
pub fn fixture_source(name: &str) -> KeySource {
    KeySource::Path(fixture_path(name))
}

/// Captures log output of the current test.
pub fn init_logger() {
    // the logger may have been installed by another test already
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}
