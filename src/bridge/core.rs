// src/bridge/core.rs

//! Pure core of the bridge.
//!
//! [`BridgeCore`] consumes [`BridgeInput`]s and returns the [`ProtocolEvent`]s
//! they produce. It is the single writer of the last known state: pumps, the
//! exit watcher and the supervisor never touch it directly, they only send
//! inputs to the funnel task that owns the core.
//!
//! The core has no channels, no Tokio types and performs no IO, so every rule
//! here is unit-testable without spawning anything.

use tracing::{debug, info, warn};

use crate::bridge::protocol::{LineClass, LineProtocol};
use crate::bridge::{BridgeInput, ExitReport, ProtocolEvent};
use crate::types::{AssistantState, StreamKind};

#[derive(Debug)]
pub struct BridgeCore {
    protocol: LineProtocol,
    last_known: AssistantState,
}

impl BridgeCore {
    pub fn new(protocol: LineProtocol) -> Self {
        Self {
            protocol,
            last_known: AssistantState::default(),
        }
    }

    /// Most recently observed state. Starts as `Starting`.
    pub fn last_known_state(&self) -> AssistantState {
        self.last_known
    }

    /// Handle a single input, returning the events to publish, in order.
    pub fn step(&mut self, input: BridgeInput) -> Vec<ProtocolEvent> {
        match input {
            BridgeInput::Line { stream, line } => self.handle_line(stream, &line),
            BridgeInput::Announce { state, detail } => {
                let mut events = Vec::with_capacity(2);
                if let Some(detail) = detail {
                    events.push(ProtocolEvent::LogLine(detail));
                }
                events.push(self.observe(state));
                events
            }
            BridgeInput::Exited(report) => self.handle_exit(report),
        }
    }

    fn handle_line(&mut self, stream: StreamKind, line: &str) -> Vec<ProtocolEvent> {
        let class = self.protocol.classify(line);
        if class == LineClass::Blank {
            return Vec::new();
        }

        // The raw line is always logged, whatever the classification.
        let mut events = vec![ProtocolEvent::LogLine(log_text(stream, line))];

        match class {
            LineClass::State(state) => events.push(self.observe(state)),
            LineClass::Command(text) => events.push(ProtocolEvent::CommandHeard(text)),
            LineClass::Crash => {
                warn!(%stream, line, "crash marker in engine output");
                events.push(self.observe(AssistantState::Error));
            }
            LineClass::UnknownState(keyword) => {
                debug!(%stream, keyword = %keyword, "ignoring unknown state keyword");
            }
            LineClass::EmptyCommand | LineClass::Plain | LineClass::Blank => {}
        }

        events
    }

    /// The one terminal decision, made when the engine process is gone.
    fn handle_exit(&mut self, report: ExitReport) -> Vec<ProtocolEvent> {
        let terminal = match &report {
            ExitReport::Unreadable(_) => AssistantState::Error,
            ExitReport::Code(code) => {
                if self.last_known == AssistantState::Error || *code != 0 {
                    AssistantState::Error
                } else {
                    AssistantState::Offline
                }
            }
        };

        info!(
            %report,
            last_known = %self.last_known,
            terminal = %terminal,
            "engine exited"
        );

        vec![
            ProtocolEvent::LogLine(format!("[bridge] engine exited ({report})")),
            self.observe(terminal),
        ]
    }

    fn observe(&mut self, state: AssistantState) -> ProtocolEvent {
        self.last_known = state;
        ProtocolEvent::StateChanged(state)
    }
}

/// Text of the log event for a raw engine line.
fn log_text(stream: StreamKind, line: &str) -> String {
    match stream {
        StreamKind::Stdout => line.to_string(),
        StreamKind::Stderr => format!("ERROR: {line}"),
    }
}
