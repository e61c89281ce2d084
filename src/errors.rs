// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! These errors never cross the public boundary of [`crate::bridge::Bridge`];
//! the supervisor turns them into events instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Engine payload not found: {}", .0.display())]
    PayloadNotFound(PathBuf),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BridgeError>;
