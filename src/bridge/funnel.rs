// src/bridge/funnel.rs

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::core::BridgeCore;
use super::{BridgeInput, ProtocolEvent};

/// Spawn the task that owns `core` and serialises every event.
///
/// All writer sites send [`BridgeInput`]s on `input_rx`'s sender; this task
/// is the only place inputs become [`ProtocolEvent`]s, so events come out
/// in one total order and the last known state has exactly one writer.
///
/// The task ends once every input sender is dropped. If the event receiver
/// goes away first, inputs keep being drained (and dropped) so the pumps
/// never block on a dead consumer.
pub fn spawn_event_funnel(
    mut core: BridgeCore,
    mut input_rx: mpsc::Receiver<BridgeInput>,
    event_tx: mpsc::Sender<ProtocolEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("event funnel started");
        let mut consumer_gone = false;

        while let Some(input) = input_rx.recv().await {
            let events = core.step(input);
            if consumer_gone {
                continue;
            }
            for event in events {
                if event_tx.send(event).await.is_err() {
                    debug!("event receiver dropped; discarding further events");
                    consumer_gone = true;
                    break;
                }
            }
        }

        info!(
            last_known = %core.last_known_state(),
            "event funnel finished (all inputs closed)"
        );
    })
}
