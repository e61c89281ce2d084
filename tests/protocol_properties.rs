// tests/protocol_properties.rs

use proptest::prelude::*;

use aidy_bridge::bridge::{BridgeCore, BridgeInput, LineClass, LineProtocol, ProtocolEvent};
use aidy_bridge::types::{AssistantState, StreamKind};

fn state_strategy() -> impl Strategy<Value = AssistantState> {
    proptest::sample::select(AssistantState::ALL.to_vec())
}

/// Randomise the letter case of `s`, one flag per character.
fn scramble_case(s: &str, flags: &[bool]) -> String {
    s.chars()
        .zip(flags.iter().cycle())
        .map(|(c, upper)| {
            if *upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn state_lines_in_any_case_yield_exactly_one_state_change(
        state in state_strategy(),
        flags in proptest::collection::vec(any::<bool>(), 1..16),
        pad in "[ \t]{0,3}",
    ) {
        let line = format!(
            "{}{}{}",
            scramble_case("STATE:", &flags),
            scramble_case(state.keyword(), &flags),
            pad
        );

        let mut core = BridgeCore::new(LineProtocol::with_default_markers().unwrap());
        let events = core.step(BridgeInput::Line { stream: StreamKind::Stdout, line: line.clone() });

        prop_assert_eq!(
            events,
            vec![ProtocolEvent::LogLine(line), ProtocolEvent::StateChanged(state)]
        );
        prop_assert_eq!(core.last_known_state(), state);
    }

    #[test]
    fn crash_markers_are_found_inside_arbitrary_text(
        before in "[a-z0-9 ]{0,20}",
        after in "[a-z0-9 ]{0,20}",
        marker in proptest::sample::select(vec![
            "Traceback (most recent call last)",
            "ModuleNotFoundError",
            "FileNotFoundError",
            "ImportError",
            "Fatal:",
        ]),
        flags in proptest::collection::vec(any::<bool>(), 1..8),
        stream in proptest::sample::select(vec![StreamKind::Stdout, StreamKind::Stderr]),
    ) {
        // A leading 'x' keeps the line clear of the STATE:/COMMAND: prefixes.
        let line = format!("x{before}{}{after}", scramble_case(marker, &flags));

        let mut core = BridgeCore::new(LineProtocol::with_default_markers().unwrap());
        core.step(BridgeInput::Line { stream: StreamKind::Stdout, line: "STATE:IDLE".to_string() });
        let events = core.step(BridgeInput::Line { stream, line });

        prop_assert_eq!(events.len(), 2);
        prop_assert_eq!(&events[1], &ProtocolEvent::StateChanged(AssistantState::Error));
        prop_assert_eq!(core.last_known_state(), AssistantState::Error);
    }

    #[test]
    fn classification_never_panics_and_logs_every_non_empty_line(line in "\\PC{0,60}") {
        let protocol = LineProtocol::with_default_markers().unwrap();
        let class = protocol.classify(&line);

        let mut core = BridgeCore::new(protocol);
        let events = core.step(BridgeInput::Line { stream: StreamKind::Stdout, line: line.clone() });

        if class == LineClass::Blank {
            prop_assert!(events.is_empty());
        } else {
            prop_assert_eq!(&events[0], &ProtocolEvent::LogLine(line));
            prop_assert!(events.len() <= 2);
        }
    }
}
