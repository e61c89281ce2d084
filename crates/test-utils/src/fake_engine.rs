use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::builders::ConfigFileBuilder;

/// A throwaway engine: a shell script in its own temp directory, launched
/// with `sh` found on `PATH`.
///
/// The script receives the UI flag as `$1`, like the real engine would.
pub struct FakeEngine {
    dir: TempDir,
    script: PathBuf,
}

impl FakeEngine {
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("creating temp dir for fake engine");
        let script = dir.path().join("engine.sh");
        fs::write(&script, body).expect("writing fake engine script");
        Self { dir, script }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Config launching this script with `sh`. The generous drain timeout
    /// keeps output ordering deterministic in tests.
    pub fn config(&self) -> ConfigFileBuilder {
        ConfigFileBuilder::new("sh", self.script.clone())
            .drain_timeout_ms(2_000)
            .stop_timeout_ms(3_000)
    }
}
