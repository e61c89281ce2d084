// src/bridge/terminate.rs

//! Forced termination of the engine together with everything it spawned.

use anyhow::Result;

/// Kill the process tree rooted at `pid`.
///
/// On unix the engine is launched as the leader of its own process group, so
/// signalling the group reaches every descendant that did not detach itself.
#[cfg(unix)]
pub fn kill_process_tree(pid: u32) -> Result<()> {
    use anyhow::Context;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).context("pid out of range")?;
    killpg(Pid::from_raw(raw), Signal::SIGKILL)
        .with_context(|| format!("killing process group {pid}"))?;
    Ok(())
}

/// Kill the process tree rooted at `pid` with `taskkill /T /F`.
#[cfg(windows)]
pub fn kill_process_tree(pid: u32) -> Result<()> {
    use std::os::windows::process::CommandExt;

    use anyhow::{Context, bail};

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    let status = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T", "/F"])
        .creation_flags(CREATE_NO_WINDOW)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .context("running taskkill")?;

    if !status.success() {
        bail!("taskkill exited with {status}");
    }
    Ok(())
}
