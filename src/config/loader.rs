// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BridgeError, Result};
use crate::fs::FileSystem;

/// Load a configuration file and return the raw, unvalidated `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for
/// the checked version.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path).map_err(BridgeError::Other)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, validate it, and anchor a relative payload
/// path to the directory holding the config file.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(fs, path)?;
    let mut config = ConfigFile::try_from(raw_config)?;
    config.anchor_payload(&config_root_dir(path));
    Ok(config)
}

/// Config file looked for in the working directory when none is given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("aidy-bridge.toml")
}

/// Directory a config path's relative entries are anchored to.
///
/// A bare filename like `aidy-bridge.toml` has an empty parent, in which case
/// the current working directory is used.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
