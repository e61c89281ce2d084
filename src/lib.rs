// src/lib.rs

pub mod bridge;
pub mod cli;
pub mod config;
pub mod console;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use crate::bridge::{Bridge, ExitReport, LaunchPlan, StartOutcome};
use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_and_validate, validate_config};
use crate::console::ConsolePresenter;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::AssistantState;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - the bridge and its event channel
/// - the console presenter
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let fs = RealFileSystem;
    let mut cfg = load_config(&fs, args.config.as_deref())?;

    if let Some(interpreter) = args.interpreter {
        cfg.engine.interpreter = interpreter;
    }
    if let Some(payload) = args.payload {
        cfg.engine.payload = PathBuf::from(payload);
    }
    validate_config(&cfg)?;

    if args.dry_run {
        print_dry_run(&cfg, &fs);
        return Ok(());
    }

    let (mut bridge, events) = Bridge::new(cfg)?;

    let presenter = tokio::spawn(async move {
        let mut console = ConsolePresenter::new(std::io::stdout());
        console.run(events).await.map(|()| console.state())
    });

    if bridge.start().await == StartOutcome::Failed {
        warn!("engine could not be started");
    }

    enum Finish {
        Interrupted,
        Exited(Option<ExitReport>),
    }

    let finish = tokio::select! {
        () = wait_for_ctrl_c() => Finish::Interrupted,
        report = bridge.wait_for_exit() => Finish::Exited(report),
    };

    match &finish {
        Finish::Interrupted => {
            info!("interrupt received; stopping engine");
            bridge.stop().await;
        }
        Finish::Exited(Some(report)) => info!(%report, "engine finished"),
        Finish::Exited(None) => debug!("no engine was running"),
    }

    // Dropping the bridge closes the funnel, which ends the presenter.
    drop(bridge);
    let final_state = presenter.await??;

    match finish {
        Finish::Exited(_) if final_state == Some(AssistantState::Error) => {
            Err(anyhow!("engine ended in the error state"))
        }
        _ => Ok(()),
    }
}

/// Load the config named on the command line, or the default file if it
/// exists, or built-in defaults.
fn load_config(fs: &dyn FileSystem, path: Option<&str>) -> crate::errors::Result<ConfigFile> {
    match path {
        Some(path) => load_and_validate(fs, path),
        None => {
            let default_path = default_config_path();
            if fs.exists(&default_path) {
                load_and_validate(fs, default_path)
            } else {
                debug!("no config file; using defaults");
                Ok(ConfigFile::default())
            }
        }
    }
}

/// Resolves once Ctrl-C is pressed. If the signal cannot be listened for,
/// never resolves, so the engine keeps running.
async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Simple dry-run output: print the config and the resolved launch plan.
fn print_dry_run(cfg: &ConfigFile, fs: &dyn FileSystem) {
    println!("aidy-bridge dry-run");
    println!("  engine.interpreter = {}", cfg.engine.interpreter);
    println!("  engine.payload = {}", cfg.engine.payload.display());
    println!("  protocol.crash_markers = {:?}", cfg.protocol.crash_markers);
    println!("  bridge.event_buffer = {}", cfg.bridge.event_buffer);
    println!();

    match LaunchPlan::prepare_from_env(&cfg.engine, fs) {
        Ok(plan) => {
            println!("launch:");
            println!("  cmd: {}", plan.display_command_line());
            println!("  cwd: {}", plan.working_dir.display());
            for (key, value) in &plan.env {
                println!("  env: {key}={value}");
            }
        }
        Err(e) => println!("launch would fail: {e}"),
    }

    debug!("dry-run complete (no process started)");
}
