// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `aidy-bridge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "aidy-bridge",
    version,
    about = "Supervise the assistant engine and relay its line protocol.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `aidy-bridge.toml` in the current directory is used when it
    /// exists, otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Override `[engine].interpreter`.
    #[arg(long, value_name = "EXE")]
    pub interpreter: Option<String>,

    /// Override `[engine].payload`.
    #[arg(long, value_name = "PATH")]
    pub payload: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AIDY_BRIDGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the launch plan, but don't start the engine.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
