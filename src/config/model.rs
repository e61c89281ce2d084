// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Raw configuration as read from a TOML file, before validation.
///
/// ```toml
/// [engine]
/// interpreter = "python"
/// payload = "PythonCore/main.py"
///
/// [engine.env]
/// AIDY_LOG = "DEBUG"
///
/// [protocol]
/// crash_markers = ["Traceback (most recent call last)", "Fatal:"]
///
/// [bridge]
/// event_buffer = 256
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub protocol: ProtocolSection,

    #[serde(default)]
    pub bridge: BridgeSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub protocol: ProtocolSection,
    pub bridge: BridgeSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        engine: EngineSection,
        protocol: ProtocolSection,
        bridge: BridgeSection,
    ) -> Self {
        Self {
            engine,
            protocol,
            bridge,
        }
    }

    /// Anchor a relative payload path to `root` (usually the directory holding
    /// the config file). Absolute payloads are left alone.
    pub fn anchor_payload(&mut self, root: &Path) {
        if self.engine.payload.as_os_str().is_empty() || self.engine.payload.is_absolute() {
            return;
        }
        self.engine.payload = root.join(&self.engine.payload);
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.engine, raw.protocol, raw.bridge)
    }
}

/// `[engine]` section: what to launch and how.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Interpreter identifier: absolute path, relative path or bare name
    /// looked up on `PATH`.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Arguments placed before the payload path.
    #[serde(default = "default_interpreter_args")]
    pub interpreter_args: Vec<String>,

    /// The engine program handed to the interpreter.
    #[serde(default = "default_payload")]
    pub payload: PathBuf,

    /// Flag appended after the payload to put the engine into line-protocol mode.
    #[serde(default = "default_ui_flag")]
    pub ui_flag: String,

    /// Fallback working directory, only used when the payload has no parent
    /// directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables for the engine.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_interpreter() -> String {
    "python".to_string()
}

fn default_interpreter_args() -> Vec<String> {
    vec!["-X".to_string(), "utf8".to_string()]
}

fn default_payload() -> PathBuf {
    PathBuf::from("PythonCore").join("main.py")
}

fn default_ui_flag() -> String {
    "--ui".to_string()
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            interpreter_args: default_interpreter_args(),
            payload: default_payload(),
            ui_flag: default_ui_flag(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }
}

/// `[protocol]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolSection {
    /// Substrings which, found anywhere in a non-protocol line (any case),
    /// mean the engine is crashing.
    #[serde(default = "default_crash_markers")]
    pub crash_markers: Vec<String>,
}

pub fn default_crash_markers() -> Vec<String> {
    [
        "Traceback (most recent call last)",
        "ModuleNotFoundError",
        "FileNotFoundError",
        "ImportError",
        "Fatal:",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ProtocolSection {
    fn default() -> Self {
        Self {
            crash_markers: default_crash_markers(),
        }
    }
}

/// `[bridge]` section: channel sizing and teardown timing.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeSection {
    /// Capacity of the outbound event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// How long the exit watcher waits for the pumps to drain before
    /// reporting the exit.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Upper bound on how long `stop()` waits for the killed engine to be reaped.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

fn default_event_buffer() -> usize {
    256
}

fn default_drain_timeout_ms() -> u64 {
    500
}

fn default_stop_timeout_ms() -> u64 {
    5000
}

impl BridgeSection {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            event_buffer: default_event_buffer(),
            drain_timeout_ms: default_drain_timeout_ms(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}
