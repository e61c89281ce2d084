// src/bridge/pump.rs

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::BridgeInput;
use crate::types::StreamKind;

/// Read `reader` line by line for the life of the process, forwarding every
/// line to the funnel.
///
/// Lines are decoded as UTF-8 with invalid bytes replaced, so stray output
/// from native code never stops the stream. End of stream, an I/O error or a
/// closed funnel end the loop quietly. A pump never decides process state;
/// only the exit watcher does.
pub fn spawn_pump<R>(
    reader: R,
    stream: StreamKind,
    pid: Option<u32>,
    input_tx: mpsc::Sender<BridgeInput>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = decode_line(&buf);
                    debug!(?pid, %stream, "{}", line);
                    let input = BridgeInput::Line { stream, line };
                    if input_tx.send(input).await.is_err() {
                        debug!(?pid, %stream, "funnel closed; stopping pump");
                        break;
                    }
                }
                Err(e) => {
                    debug!(?pid, %stream, error = %e, "read failed; stopping pump");
                    break;
                }
            }
        }

        debug!(?pid, %stream, "pump ended");
    })
}

/// Strip one trailing `\n` or `\r\n` and decode lossily.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
