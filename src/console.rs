// src/console.rs

//! Headless presentation layer used by the `aidy-bridge` binary.
//!
//! It is just one subscriber of the bridge's event channel: it renders
//! state changes with their status text, recognised commands, and the raw
//! engine log.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::bridge::ProtocolEvent;
use crate::types::AssistantState;

#[derive(Debug)]
pub struct ConsolePresenter<W: Write> {
    out: W,
    state: Option<AssistantState>,
    last_command: Option<String>,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: None,
            last_command: None,
        }
    }

    /// State currently displayed, if any has been received.
    pub fn state(&self) -> Option<AssistantState> {
        self.state
    }

    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render one event. A state equal to the displayed one is not repeated.
    pub fn render(&mut self, event: &ProtocolEvent) -> Result<()> {
        match event {
            ProtocolEvent::StateChanged(state) => {
                if self.state == Some(*state) {
                    return Ok(());
                }
                self.state = Some(*state);
                writeln!(self.out, "[state] {}", state.status_text())
            }
            ProtocolEvent::CommandHeard(text) => {
                self.last_command = Some(text.clone());
                writeln!(self.out, "[command] {text}")
            }
            ProtocolEvent::LogLine(line) => writeln!(self.out, "{line}"),
        }
        .context("writing to console")?;

        self.out.flush().context("flushing console")
    }

    /// Render events until the channel closes.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<ProtocolEvent>) -> Result<()> {
        while let Some(event) = rx.recv().await {
            self.render(&event)?;
        }
        Ok(())
    }
}
