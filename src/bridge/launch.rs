// src/bridge/launch.rs

//! Everything needed to launch the engine, computed before spawning.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::bridge::resolver::resolve_executable;
use crate::config::EngineSection;
use crate::errors::{BridgeError, Result};
use crate::fs::FileSystem;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A fully resolved launch: program, arguments, working directory and the
/// environment additions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
    pub env: Vec<(String, String)>,
}

impl LaunchPlan {
    /// Resolve the interpreter and validate the payload.
    ///
    /// Fails with [`BridgeError::ExecutableNotFound`] or
    /// [`BridgeError::PayloadNotFound`]; nothing is spawned here.
    pub fn prepare(
        engine: &EngineSection,
        fs: &dyn FileSystem,
        cwd: &Path,
        path_var: Option<&OsStr>,
    ) -> Result<Self> {
        let program = resolve_executable(fs, &engine.interpreter, cwd, path_var)?;

        if engine.payload.as_os_str().is_empty() {
            return Err(BridgeError::PayloadNotFound(engine.payload.clone()));
        }
        let payload = if engine.payload.is_absolute() {
            engine.payload.clone()
        } else {
            cwd.join(&engine.payload)
        };
        if !fs.is_file(&payload) {
            return Err(BridgeError::PayloadNotFound(payload));
        }

        // The payload's directory wins over any configured working directory.
        let working_dir = match payload.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => engine
                .working_dir
                .clone()
                .unwrap_or_else(|| cwd.to_path_buf()),
        };

        let mut args: Vec<OsString> = engine.interpreter_args.iter().map(OsString::from).collect();
        args.push(payload.into_os_string());
        args.push(OsString::from(&engine.ui_flag));

        let mut env: Vec<(String, String)> = engine
            .env
            .iter()
            .filter(|(key, _)| !is_forced_var(key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        env.push(("PYTHONUTF8".to_string(), "1".to_string()));
        env.push(("PYTHONIOENCODING".to_string(), "utf-8".to_string()));
        env.push((
            "PYTHONPATH".to_string(),
            working_dir.to_string_lossy().into_owned(),
        ));

        Ok(Self {
            program,
            args,
            working_dir,
            env,
        })
    }

    /// [`LaunchPlan::prepare`] against this process's working directory and `PATH`.
    pub fn prepare_from_env(engine: &EngineSection, fs: &dyn FileSystem) -> Result<Self> {
        let cwd = env::current_dir()?;
        let path_var = env::var_os("PATH");
        Self::prepare(engine, fs, &cwd, path_var.as_deref())
    }

    /// Build the command: both output streams piped, no console window, and
    /// (on unix) a fresh process group so the whole tree can be killed.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.working_dir)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        cmd
    }

    /// Shell-ish rendering for logs and `--dry-run`.
    pub fn display_command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

fn is_forced_var(key: &str) -> bool {
    matches!(
        key.to_ascii_uppercase().as_str(),
        "PYTHONUTF8" | "PYTHONIOENCODING" | "PYTHONPATH"
    )
}
