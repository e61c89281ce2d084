use std::path::PathBuf;

use aidy_bridge::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Unlike the TOML defaults, `interpreter_args` starts empty so that any
/// interpreter (e.g. `sh`) can be used.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(interpreter: &str, payload: impl Into<PathBuf>) -> Self {
        let mut config = RawConfigFile::default();
        config.engine.interpreter = interpreter.to_string();
        config.engine.interpreter_args.clear();
        config.engine.payload = payload.into();
        Self { config }
    }

    pub fn interpreter_arg(mut self, arg: &str) -> Self {
        self.config.engine.interpreter_args.push(arg.to_string());
        self
    }

    pub fn ui_flag(mut self, flag: &str) -> Self {
        self.config.engine.ui_flag = flag.to_string();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.engine.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.config.engine.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn crash_markers(mut self, markers: &[&str]) -> Self {
        self.config.protocol.crash_markers = markers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.config.bridge.event_buffer = capacity;
        self
    }

    pub fn drain_timeout_ms(mut self, ms: u64) -> Self {
        self.config.bridge.drain_timeout_ms = ms;
        self
    }

    pub fn stop_timeout_ms(mut self, ms: u64) -> Self {
        self.config.bridge.stop_timeout_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
