// tests/bridge_core.rs

//! Exit decisions and event shaping, exercised on the pure core without
//! spawning anything.

use std::error::Error;

use aidy_bridge::bridge::{BridgeCore, BridgeInput, ExitReport, LineProtocol, ProtocolEvent};
use aidy_bridge::types::{AssistantState, StreamKind};
use aidy_bridge_test_utils::{init_tracing, states};

type TestResult = Result<(), Box<dyn Error>>;

fn core() -> Result<BridgeCore, Box<dyn Error>> {
    Ok(BridgeCore::new(LineProtocol::with_default_markers()?))
}

fn stdout(line: &str) -> BridgeInput {
    BridgeInput::Line {
        stream: StreamKind::Stdout,
        line: line.to_string(),
    }
}

fn stderr(line: &str) -> BridgeInput {
    BridgeInput::Line {
        stream: StreamKind::Stderr,
        line: line.to_string(),
    }
}

#[test]
fn initial_state_is_starting() -> TestResult {
    assert_eq!(core()?.last_known_state(), AssistantState::Starting);
    Ok(())
}

#[test]
fn unknown_state_yields_only_the_log_line() -> TestResult {
    init_tracing();
    let mut core = core()?;
    core.step(stdout("STATE:LISTENING"));

    let events = core.step(stdout("STATE:UNKNOWNTOKEN"));

    assert_eq!(
        events,
        vec![ProtocolEvent::LogLine("STATE:UNKNOWNTOKEN".to_string())]
    );
    assert_eq!(core.last_known_state(), AssistantState::Listening);
    Ok(())
}

#[test]
fn commands_are_logged_then_published() -> TestResult {
    let mut core = core()?;

    assert_eq!(
        core.step(stdout("COMMAND:  hello  ")),
        vec![
            ProtocolEvent::LogLine("COMMAND:  hello  ".to_string()),
            ProtocolEvent::CommandHeard("hello".to_string()),
        ]
    );
    assert_eq!(
        core.step(stdout("COMMAND:")),
        vec![ProtocolEvent::LogLine("COMMAND:".to_string())]
    );
    Ok(())
}

#[test]
fn stderr_lines_are_logged_with_error_prefix() -> TestResult {
    let mut core = core()?;

    let events = core.step(stderr("warming up model"));

    assert_eq!(
        events,
        vec![ProtocolEvent::LogLine("ERROR: warming up model".to_string())]
    );
    assert_eq!(core.last_known_state(), AssistantState::Starting);
    Ok(())
}

#[test]
fn crash_marker_on_stderr_sets_error() -> TestResult {
    let mut core = core()?;
    core.step(stdout("STATE:IDLE"));

    let events = core.step(stderr("Traceback (most recent call last):"));

    assert_eq!(
        events,
        vec![
            ProtocolEvent::LogLine("ERROR: Traceback (most recent call last):".to_string()),
            ProtocolEvent::StateChanged(AssistantState::Error),
        ]
    );
    assert_eq!(core.last_known_state(), AssistantState::Error);
    Ok(())
}

#[test]
fn crash_heuristic_is_not_deduplicated() -> TestResult {
    let mut core = core()?;

    let first = core.step(stdout("Traceback (most recent call last):"));
    let second = core.step(stdout("ImportError: no module"));

    assert_eq!(states(&first), vec![AssistantState::Error]);
    assert_eq!(states(&second), vec![AssistantState::Error]);
    Ok(())
}

#[test]
fn empty_lines_produce_nothing() -> TestResult {
    let mut core = core()?;

    assert!(core.step(stdout("")).is_empty());
    assert!(core.step(stderr("")).is_empty());
    Ok(())
}

#[test]
fn whitespace_only_lines_are_logged_without_classification() -> TestResult {
    let mut core = core()?;

    assert_eq!(
        core.step(stdout("   ")),
        vec![ProtocolEvent::LogLine("   ".to_string())]
    );
    assert_eq!(
        core.step(stderr("\t")),
        vec![ProtocolEvent::LogLine("ERROR: \t".to_string())]
    );
    assert_eq!(core.last_known_state(), AssistantState::Starting);
    Ok(())
}

#[test]
fn any_state_may_follow_any_other() -> TestResult {
    let mut core = core()?;

    for line in ["STATE:SUCCESS", "STATE:STARTING", "STATE:OFFLINE", "STATE:SPEAKING"] {
        let events = core.step(stdout(line));
        assert_eq!(states(&events).len(), 1, "line {line}");
    }
    assert_eq!(core.last_known_state(), AssistantState::Speaking);
    Ok(())
}

#[test]
fn clean_exit_goes_offline() -> TestResult {
    let mut core = core()?;
    core.step(stdout("STATE:IDLE"));

    let events = core.step(BridgeInput::Exited(ExitReport::Code(0)));

    assert_eq!(states(&events), vec![AssistantState::Offline]);
    assert_eq!(
        events.first(),
        Some(&ProtocolEvent::LogLine(
            "[bridge] engine exited (code 0)".to_string()
        ))
    );
    assert_eq!(core.last_known_state(), AssistantState::Offline);
    Ok(())
}

#[test]
fn non_zero_exit_is_an_error_even_when_idle() -> TestResult {
    let mut core = core()?;
    core.step(stdout("STATE:IDLE"));

    let events = core.step(BridgeInput::Exited(ExitReport::Code(3)));

    assert_eq!(states(&events), vec![AssistantState::Error]);
    Ok(())
}

#[test]
fn clean_exit_after_error_stays_error() -> TestResult {
    let mut core = core()?;
    core.step(stdout("Fatal: lost audio device"));

    let events = core.step(BridgeInput::Exited(ExitReport::Code(0)));

    assert_eq!(states(&events), vec![AssistantState::Error]);
    Ok(())
}

#[test]
fn engine_asserted_error_counts_as_last_known() -> TestResult {
    let mut core = core()?;
    core.step(stdout("STATE:ERROR"));

    let events = core.step(BridgeInput::Exited(ExitReport::Code(0)));

    assert_eq!(states(&events), vec![AssistantState::Error]);
    Ok(())
}

#[test]
fn unreadable_exit_code_is_an_error() -> TestResult {
    let mut core = core()?;
    core.step(stdout("STATE:IDLE"));

    let events = core.step(BridgeInput::Exited(ExitReport::Unreadable(
        "signal: 9 (SIGKILL)".to_string(),
    )));

    assert_eq!(states(&events), vec![AssistantState::Error]);
    Ok(())
}

#[test]
fn announcements_log_detail_before_state() -> TestResult {
    let mut core = core()?;

    let events = core.step(BridgeInput::Announce {
        state: AssistantState::Error,
        detail: Some("[bridge] cannot start engine".to_string()),
    });
    assert_eq!(
        events,
        vec![
            ProtocolEvent::LogLine("[bridge] cannot start engine".to_string()),
            ProtocolEvent::StateChanged(AssistantState::Error),
        ]
    );

    // A fresh start resets the cell, so a clean exit of the new run is Offline.
    core.step(BridgeInput::Announce {
        state: AssistantState::Starting,
        detail: None,
    });
    let events = core.step(BridgeInput::Exited(ExitReport::Code(0)));
    assert_eq!(states(&events), vec![AssistantState::Offline]);
    Ok(())
}
