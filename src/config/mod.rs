// src/config/mod.rs

//! Configuration loading and validation for the bridge.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like channel sizing (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{config_root_dir, default_config_path, load_and_validate, load_from_path};
pub use model::{BridgeSection, ConfigFile, EngineSection, ProtocolSection, RawConfigFile};
pub use validate::validate_config;
