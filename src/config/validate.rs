// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BridgeError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BridgeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.engine, raw.protocol, raw.bridge))
    }
}

/// Validate an already-built config again (e.g. after CLI overrides).
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    let raw = RawConfigFile {
        engine: cfg.engine.clone(),
        protocol: cfg.protocol.clone(),
        bridge: cfg.bridge.clone(),
    };
    validate_raw_config(&raw)
}

// Interpreter and payload are deliberately not checked here: an unresolvable
// engine is reported at start time as an Error state, and can be retried.
fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    validate_protocol(cfg)?;
    validate_bridge(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if cfg.engine.ui_flag.trim().is_empty() {
        return Err(BridgeError::ConfigError(
            "[engine].ui_flag must not be empty".to_string(),
        ));
    }

    for key in cfg.engine.env.keys() {
        if key.trim().is_empty() || key.contains('=') {
            return Err(BridgeError::ConfigError(format!(
                "[engine.env] has invalid variable name '{}'",
                key
            )));
        }
    }
    Ok(())
}

fn validate_protocol(cfg: &RawConfigFile) -> Result<()> {
    if let Some(idx) = cfg
        .protocol
        .crash_markers
        .iter()
        .position(|m| m.trim().is_empty())
    {
        return Err(BridgeError::ConfigError(format!(
            "[protocol].crash_markers[{}] must not be blank",
            idx
        )));
    }
    Ok(())
}

fn validate_bridge(cfg: &RawConfigFile) -> Result<()> {
    if cfg.bridge.event_buffer == 0 {
        return Err(BridgeError::ConfigError(
            "[bridge].event_buffer must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
