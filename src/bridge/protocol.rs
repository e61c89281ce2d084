// src/bridge/protocol.rs

//! Line protocol spoken by the engine on its output streams.
//!
//! ```text
//! STATE:<keyword>    state assertion, keyword from the fixed vocabulary
//! COMMAND:<text>     a recognised utterance / command
//! anything else      diagnostic output, scanned for crash markers
//! ```
//!
//! Prefixes match case-insensitively but must start the line exactly; the
//! remainder is trimmed before use.

use regex::{RegexSet, RegexSetBuilder};

use crate::config::ProtocolSection;
use crate::config::model::default_crash_markers;
use crate::errors::{BridgeError, Result};
use crate::types::AssistantState;

const STATE_PREFIX: &str = "STATE:";
const COMMAND_PREFIX: &str = "COMMAND:";

/// Result of classifying one line. First matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// Empty line; nothing to log or classify.
    Blank,
    /// `STATE:` with a recognised keyword.
    State(AssistantState),
    /// `STATE:` with a keyword outside the vocabulary. Tolerated for forward
    /// compatibility: logged, never an error.
    UnknownState(String),
    /// `COMMAND:` with non-empty text.
    Command(String),
    /// `COMMAND:` with nothing after it.
    EmptyCommand,
    /// A non-protocol line containing a crash marker.
    Crash,
    /// Any other diagnostic line.
    Plain,
}

/// Stateless line classifier.
#[derive(Debug, Clone)]
pub struct LineProtocol {
    crash_markers: RegexSet,
}

impl LineProtocol {
    /// Build a classifier matching the given crash markers literally, in any case.
    pub fn new<I, S>(markers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = markers
            .into_iter()
            .map(|m| regex::escape(m.as_ref().trim()))
            .collect();

        let crash_markers = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()
            .map_err(|e| BridgeError::ConfigError(format!("invalid crash marker: {e}")))?;

        Ok(Self { crash_markers })
    }

    pub fn from_config(section: &ProtocolSection) -> Result<Self> {
        Self::new(&section.crash_markers)
    }

    /// Classifier with the stock Python crash markers.
    pub fn with_default_markers() -> Result<Self> {
        Self::new(default_crash_markers())
    }

    pub fn classify(&self, line: &str) -> LineClass {
        if line.is_empty() {
            return LineClass::Blank;
        }
        if line.trim().is_empty() {
            return LineClass::Plain;
        }

        if let Some(rest) = strip_prefix_ignore_case(line, STATE_PREFIX) {
            let keyword = rest.trim();
            return match AssistantState::from_keyword(keyword) {
                Some(state) => LineClass::State(state),
                None => LineClass::UnknownState(keyword.to_string()),
            };
        }

        if let Some(rest) = strip_prefix_ignore_case(line, COMMAND_PREFIX) {
            let text = rest.trim();
            return if text.is_empty() {
                LineClass::EmptyCommand
            } else {
                LineClass::Command(text.to_string())
            };
        }

        if self.is_crash_line(line) {
            return LineClass::Crash;
        }

        LineClass::Plain
    }

    /// True when the line contains any crash marker, in any case.
    pub fn is_crash_line(&self, line: &str) -> bool {
        self.crash_markers.is_match(line)
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}
