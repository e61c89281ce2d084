pub mod builders;
pub mod fake_engine;

use std::sync::Once;
use std::time::Duration;

use aidy_bridge::bridge::ProtocolEvent;
use aidy_bridge::types::AssistantState;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Receive events until a `StateChanged` satisfying `stop` arrives (inclusive).
///
/// Panics if the channel closes or nothing matching arrives within 5 seconds.
pub async fn collect_until<F>(rx: &mut mpsc::Receiver<ProtocolEvent>, mut stop: F) -> Vec<ProtocolEvent>
where
    F: FnMut(AssistantState) -> bool,
{
    with_timeout(async {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = matches!(event, ProtocolEvent::StateChanged(s) if stop(s));
            events.push(event);
            if done {
                return events;
            }
        }
        panic!("event channel closed before the expected state; got {events:?}");
    })
    .await
}

/// Receive events until the supervisor's exit report has been published:
/// the `[bridge] engine exited` log line followed by its terminal state.
pub async fn collect_until_exit(rx: &mut mpsc::Receiver<ProtocolEvent>) -> Vec<ProtocolEvent> {
    with_timeout(async {
        let mut events = Vec::new();
        let mut exit_logged = false;
        while let Some(event) = rx.recv().await {
            let done = exit_logged && matches!(event, ProtocolEvent::StateChanged(_));
            if let ProtocolEvent::LogLine(line) = &event {
                if line.starts_with("[bridge] engine exited") {
                    exit_logged = true;
                }
            }
            events.push(event);
            if done {
                return events;
            }
        }
        panic!("event channel closed before the engine exit was reported; got {events:?}");
    })
    .await
}

/// All `StateChanged` values in `events`, in order.
pub fn states(events: &[ProtocolEvent]) -> Vec<AssistantState> {
    events
        .iter()
        .filter_map(|e| match e {
            ProtocolEvent::StateChanged(s) => Some(*s),
            _ => None,
        })
        .collect()
}

/// All `CommandHeard` texts in `events`, in order.
pub fn commands(events: &[ProtocolEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ProtocolEvent::CommandHeard(t) => Some(t.clone()),
            _ => None,
        })
        .collect()
}

/// All `LogLine` texts in `events`, in order.
pub fn log_lines(events: &[ProtocolEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ProtocolEvent::LogLine(l) => Some(l.clone()),
            _ => None,
        })
        .collect()
}
