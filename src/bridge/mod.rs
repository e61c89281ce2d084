// src/bridge/mod.rs

//! Supervision of the external engine process.
//!
//! Data flow:
//!
//! ```text
//!  Bridge::start ──► resolver ──► launch ──► spawn
//!                                              │
//!        stdout pump ──┐                       │
//!        stderr pump ──┼──► BridgeInput ──► funnel (owns BridgeCore) ──► ProtocolEvent
//!        exit watcher ─┘                    ▲
//!  Bridge announcements ────────────────────┘
//! ```
//!
//! - [`resolver`] turns the configured interpreter into an absolute path.
//! - [`launch`] builds the command line, environment and working directory.
//! - [`pump`] reads one output stream line by line.
//! - [`protocol`] classifies a single line.
//! - [`core`] is the pure, single owner of the last known state; it decides
//!   what events each input produces, including the terminal exit decision.
//! - [`funnel`] is the async task that drives the core and publishes events
//!   on the one ordered outbound channel.
//! - [`terminate`] kills the engine and everything it spawned.
//! - [`supervisor`] owns the single process handle.

pub mod core;
pub mod funnel;
pub mod launch;
pub mod protocol;
pub mod pump;
pub mod resolver;
pub mod supervisor;
pub mod terminate;

use std::fmt;

use crate::types::{AssistantState, StreamKind};

pub use self::core::BridgeCore;
pub use launch::LaunchPlan;
pub use protocol::{LineClass, LineProtocol};
pub use resolver::resolve_executable;
pub use supervisor::{Bridge, StartOutcome};

/// Events published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    StateChanged(AssistantState),
    CommandHeard(String),
    LogLine(String),
}

/// How the engine process ended, as seen by the exit watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReport {
    /// The OS reported an exit code.
    Code(i32),
    /// No exit code could be obtained (wait failed, or killed by a signal).
    Unreadable(String),
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReport::Code(code) => write!(f, "code {code}"),
            ExitReport::Unreadable(reason) => write!(f, "exit code unavailable: {reason}"),
        }
    }
}

/// Messages flowing into the funnel from every writer site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeInput {
    /// A raw line read by one of the pumps.
    Line { stream: StreamKind, line: String },
    /// A state asserted by the supervisor itself (starting, launch failure),
    /// optionally preceded by a diagnostic log line.
    Announce {
        state: AssistantState,
        detail: Option<String>,
    },
    /// The engine process terminated.
    Exited(ExitReport),
}
