// src/types.rs

use std::fmt;
use std::str::FromStr;

/// Activity / lifecycle phase reported by the engine.
///
/// The vocabulary is fixed, but no transition table is enforced: any state may
/// follow any other. The engine asserts states, the bridge only relays them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssistantState {
    #[default]
    Starting,
    Idle,
    Listening,
    Processing,
    Speaking,
    Confirming,
    FollowUp,
    Executing,
    Success,
    Warning,
    Error,
    Offline,
}

impl AssistantState {
    /// Every state, in declaration order.
    pub const ALL: [AssistantState; 12] = [
        AssistantState::Starting,
        AssistantState::Idle,
        AssistantState::Listening,
        AssistantState::Processing,
        AssistantState::Speaking,
        AssistantState::Confirming,
        AssistantState::FollowUp,
        AssistantState::Executing,
        AssistantState::Success,
        AssistantState::Warning,
        AssistantState::Error,
        AssistantState::Offline,
    ];

    /// Map a `STATE:` keyword to a state.
    ///
    /// Matching is case-insensitive. Unknown keywords return `None`; callers
    /// must treat that as "ignore", never as an error.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let state = match keyword.trim().to_ascii_uppercase().as_str() {
            "STARTING" => AssistantState::Starting,
            "IDLE" => AssistantState::Idle,
            "LISTENING" => AssistantState::Listening,
            "PROCESSING" => AssistantState::Processing,
            "SPEAKING" => AssistantState::Speaking,
            "CONFIRM" => AssistantState::Confirming,
            "FOLLOWUP" => AssistantState::FollowUp,
            "EXECUTING" => AssistantState::Executing,
            "SUCCESS" => AssistantState::Success,
            "WARNING" => AssistantState::Warning,
            "ERROR" => AssistantState::Error,
            "OFFLINE" => AssistantState::Offline,
            _ => return None,
        };
        Some(state)
    }

    /// Keyword the engine uses for this state on the wire.
    pub fn keyword(self) -> &'static str {
        match self {
            AssistantState::Starting => "STARTING",
            AssistantState::Idle => "IDLE",
            AssistantState::Listening => "LISTENING",
            AssistantState::Processing => "PROCESSING",
            AssistantState::Speaking => "SPEAKING",
            AssistantState::Confirming => "CONFIRM",
            AssistantState::FollowUp => "FOLLOWUP",
            AssistantState::Executing => "EXECUTING",
            AssistantState::Success => "SUCCESS",
            AssistantState::Warning => "WARNING",
            AssistantState::Error => "ERROR",
            AssistantState::Offline => "OFFLINE",
        }
    }

    /// Human-facing status text shown by the presentation layer.
    pub fn status_text(self) -> &'static str {
        match self {
            AssistantState::Starting => "STARTING...",
            AssistantState::Idle => "IDLE",
            AssistantState::Listening => "LISTENING...",
            AssistantState::Processing => "PROCESSING...",
            AssistantState::Speaking => "SPEAKING...",
            AssistantState::Confirming => "CONFIRM / CANCEL",
            AssistantState::FollowUp => "FOLLOW-UP...",
            AssistantState::Executing => "EXECUTING...",
            AssistantState::Success => "FINISHED",
            AssistantState::Warning => "WARNING",
            AssistantState::Error => "ERROR",
            AssistantState::Offline => "OFFLINE",
        }
    }

    /// `Error` and `Offline` are the only outcomes the supervisor itself
    /// decides when the engine exits.
    pub fn is_terminal(self) -> bool {
        matches!(self, AssistantState::Error | AssistantState::Offline)
    }
}

impl fmt::Display for AssistantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for AssistantState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssistantState::from_keyword(s)
            .ok_or_else(|| format!("unknown assistant state keyword: {}", s.trim()))
    }
}

/// Which output channel of the engine a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}
