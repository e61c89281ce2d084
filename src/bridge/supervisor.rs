// src/bridge/supervisor.rs

//! Process supervisor: owns the single engine process.
//!
//! Public operations never fail from the caller's point of view. Launch
//! problems become `StateChanged(Error)` plus a diagnostic log line, teardown
//! problems are logged and swallowed.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, error, info, warn};

use super::core::BridgeCore;
use super::funnel::spawn_event_funnel;
use super::launch::LaunchPlan;
use super::protocol::LineProtocol;
use super::pump::spawn_pump;
use super::terminate::kill_process_tree;
use super::{BridgeInput, ExitReport, ProtocolEvent};
use crate::config::{ConfigFile, validate_config};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{AssistantState, StreamKind};

const INPUT_BUFFER: usize = 64;

/// What a call to [`Bridge::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new engine process was spawned.
    Launched { pid: Option<u32> },
    /// An engine is already running; nothing was done.
    AlreadyRunning,
    /// Resolution or spawn failed; an Error state was published.
    Failed,
}

/// The live engine process as seen by the supervisor.
///
/// The `Child` itself lives inside the exit watcher task; the supervisor
/// keeps the means to stop it and to observe its exit.
#[derive(Debug)]
struct ProcessHandle {
    pid: Option<u32>,
    kill_tx: oneshot::Sender<()>,
    /// Fires once the child has been reaped, before the exit is reported.
    reaped_rx: oneshot::Receiver<()>,
    watcher: JoinHandle<()>,
    exit: Arc<OnceLock<ExitReport>>,
}

impl ProcessHandle {
    fn is_running(&self) -> bool {
        self.exit.get().is_none() && !self.watcher.is_finished()
    }
}

/// Supervises one engine process and publishes its lifecycle as
/// [`ProtocolEvent`]s.
///
/// Start/stop calls must be serialised by the caller (`&mut self` enforces
/// this within one owner).
#[derive(Debug)]
pub struct Bridge {
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
    input_tx: mpsc::Sender<BridgeInput>,
    handle: Option<ProcessHandle>,
    /// Watcher of a stopped engine that may still be publishing its exit.
    retired: Option<JoinHandle<()>>,
}

impl Bridge {
    /// Create a bridge and the receiving end of its event channel.
    ///
    /// Spawns the event funnel, so this must be called inside a Tokio runtime.
    pub fn new(config: ConfigFile) -> Result<(Self, mpsc::Receiver<ProtocolEvent>)> {
        Self::with_file_system(config, Arc::new(RealFileSystem))
    }

    /// Like [`Bridge::new`], with a custom filesystem for the launch checks.
    pub fn with_file_system(
        config: ConfigFile,
        fs: Arc<dyn FileSystem>,
    ) -> Result<(Self, mpsc::Receiver<ProtocolEvent>)> {
        validate_config(&config)?;
        let protocol = LineProtocol::from_config(&config.protocol)?;
        let (input_tx, input_rx) = mpsc::channel::<BridgeInput>(INPUT_BUFFER);
        let (event_tx, event_rx) = mpsc::channel::<ProtocolEvent>(config.bridge.event_buffer);

        // Detached; ends when the bridge and all of its tasks drop their senders.
        let _funnel = spawn_event_funnel(BridgeCore::new(protocol), input_rx, event_tx);

        let bridge = Self {
            config,
            fs,
            input_tx,
            handle: None,
            retired: None,
        };
        Ok((bridge, event_rx))
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// True while the engine process has not yet exited.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(ProcessHandle::is_running)
    }

    /// OS process id of the current engine, if one is held.
    pub fn pid(&self) -> Option<u32> {
        self.handle.as_ref().and_then(|h| h.pid)
    }

    /// Launch the engine unless one is already running.
    ///
    /// A handle whose process already exited is reaped first, so calling
    /// `start` again after an exit restarts the engine.
    pub async fn start(&mut self) -> StartOutcome {
        if self.is_running() {
            debug!(pid = ?self.pid(), "engine already running; start ignored");
            return StartOutcome::AlreadyRunning;
        }
        self.reap().await;

        let plan = match LaunchPlan::prepare_from_env(&self.config.engine, self.fs.as_ref()) {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "cannot start engine");
                self.announce(
                    AssistantState::Error,
                    Some(format!("[bridge] cannot start engine: {e}")),
                )
                .await;
                return StartOutcome::Failed;
            }
        };

        self.announce(AssistantState::Starting, None).await;

        info!(
            cmd = %plan.display_command_line(),
            cwd = %plan.working_dir.display(),
            "launching engine"
        );

        let mut child = match plan.command().spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(error = %e, program = %plan.program.display(), "failed to launch engine");
                self.announce(
                    AssistantState::Error,
                    Some(format!(
                        "[bridge] failed to launch {}: {e}",
                        plan.program.display()
                    )),
                )
                .await;
                return StartOutcome::Failed;
            }
        };

        let pid = child.id();
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(spawn_pump(stdout, StreamKind::Stdout, pid, self.input_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(spawn_pump(stderr, StreamKind::Stderr, pid, self.input_tx.clone()));
        }

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let (reaped_tx, reaped_rx) = oneshot::channel::<()>();
        let exit = Arc::new(OnceLock::new());
        let watcher = tokio::spawn(watch_exit(
            child,
            pid,
            kill_rx,
            reaped_tx,
            pumps,
            self.config.bridge.drain_timeout(),
            self.input_tx.clone(),
            Arc::clone(&exit),
        ));

        info!(?pid, "engine started");
        self.handle = Some(ProcessHandle {
            pid,
            kill_tx,
            reaped_rx,
            watcher,
            exit,
        });

        StartOutcome::Launched { pid }
    }

    /// Force-terminate the engine and its descendants, then clear the handle.
    ///
    /// No-op when nothing was started. Waits at most `stop_timeout` for the
    /// child to be reaped; failures are logged, never returned. The exit is
    /// still reported on the event channel, however slowly it is drained.
    pub async fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            debug!("stop requested but no engine is running");
            return;
        };
        let ProcessHandle {
            pid,
            kill_tx,
            reaped_rx,
            watcher,
            ..
        } = handle;

        info!(?pid, "stopping engine");
        // Err only means the watcher already finished.
        let _ = kill_tx.send(());

        match timeout(self.config.bridge.stop_timeout(), reaped_rx).await {
            // A closed channel means the watcher is already past the reap.
            Ok(_) => debug!(?pid, "engine stopped"),
            Err(_) => warn!(?pid, "engine was not reaped within the stop timeout"),
        }

        self.retired = Some(watcher);
    }

    /// Stop the engine and release the bridge.
    pub async fn dispose(mut self) {
        self.stop().await;
    }

    /// Wait until the current engine exits on its own and return how it ended.
    ///
    /// Returns `None` when no engine was started. Cancel-safe: dropping the
    /// future leaves the handle in place.
    pub async fn wait_for_exit(&mut self) -> Option<ExitReport> {
        let handle = self.handle.as_mut()?;
        if let Err(e) = (&mut handle.watcher).await {
            warn!(pid = ?handle.pid, error = %e, "exit watcher failed");
        }
        let report = handle.exit.get().cloned();
        self.handle = None;
        report
    }

    async fn reap(&mut self) {
        if let Some(watcher) = self.retired.take() {
            debug!("waiting for the stopped engine's exit report");
            if let Err(e) = watcher.await {
                warn!(error = %e, "exit watcher failed");
            }
        }
        if let Some(handle) = self.handle.take() {
            debug!(pid = ?handle.pid, "reaping exited engine before restart");
            if let Err(e) = handle.watcher.await {
                warn!(pid = ?handle.pid, error = %e, "exit watcher failed");
            }
        }
    }

    async fn announce(&self, state: AssistantState, detail: Option<String>) {
        if self
            .input_tx
            .send(BridgeInput::Announce { state, detail })
            .await
            .is_err()
        {
            debug!(%state, "event funnel closed; announcement dropped");
        }
    }
}

impl Drop for Bridge {
    /// Best-effort synchronous teardown. The watcher task still reaps the
    /// child and reports the exit.
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.is_running() {
                if let Some(pid) = handle.pid {
                    if let Err(e) = kill_process_tree(pid) {
                        debug!(pid, error = %e, "process tree kill on drop failed");
                    }
                }
            }
        }
    }
}

/// Exit watcher: the only place the process's end is observed.
///
/// Runs exactly once per spawned engine. Waits for the child (or a stop
/// request), gives the pumps up to `drain` to flush buffered output, then
/// reports the exit to the funnel. Never aborted once spawned.
async fn watch_exit(
    mut child: Child,
    pid: Option<u32>,
    mut kill_rx: oneshot::Receiver<()>,
    reaped_tx: oneshot::Sender<()>,
    pumps: Vec<JoinHandle<()>>,
    drain: Duration,
    input_tx: mpsc::Sender<BridgeInput>,
    exit: Arc<OnceLock<ExitReport>>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        request = &mut kill_rx => {
            if request.is_ok() {
                force_kill(&mut child, pid);
            }
            child.wait().await
        }
    };

    let report = match status {
        Ok(status) => match status.code() {
            Some(code) => ExitReport::Code(code),
            None => ExitReport::Unreadable(status.to_string()),
        },
        Err(e) => ExitReport::Unreadable(e.to_string()),
    };
    let _ = exit.set(report.clone());
    let _ = reaped_tx.send(());

    let deadline = Instant::now() + drain;
    let mut drained = true;
    for pump in pumps {
        if timeout_at(deadline, pump).await.is_err() {
            drained = false;
            break;
        }
    }

    if !drained {
        // Descendants outliving the engine keep the pipes open. The group id
        // stays reserved while any member is alive.
        debug!(?pid, "output still open after drain timeout; killing leftover processes");
        if let Some(pid) = pid {
            if let Err(e) = kill_process_tree(pid) {
                debug!(pid, error = %e, "leftover process kill failed");
            }
        }
    }

    if input_tx.send(BridgeInput::Exited(report)).await.is_err() {
        debug!(?pid, "event funnel closed before exit could be reported");
    }
}

fn force_kill(child: &mut Child, pid: Option<u32>) {
    if let Some(pid) = pid {
        if let Err(e) = kill_process_tree(pid) {
            debug!(pid, error = %e, "process tree kill failed; falling back to direct kill");
        }
    }
    if let Err(e) = child.start_kill() {
        debug!(?pid, error = %e, "direct kill failed");
    }
}
