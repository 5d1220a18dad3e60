//! Newline-delimited JSON notification source.
//!
//! Each line is one [`TransitionNotification`]:
//!
//! ```text
//! {"type":"transition","kind":1,"regions":["home"]}
//! {"type":"error","code":1001}
//! ```
//!
//! Lines are read as raw bytes and decoded with `serde_json`, so invalid
//! UTF-8, broken JSON and unknown `type` tags all take the same path: the
//! line is logged and skipped. A read error ends the input; nothing here
//! returns an error to the caller.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, warn};

use crate::notification::TransitionNotification;
use crate::worker::WorkerHandle;

/// Counters for one pass over the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub lines: usize,
    pub submitted: usize,
    pub skipped: usize,
}

/// Feed every well-formed line of `reader` to the worker.
///
/// Returns when the input ends, a read fails, or the worker stops accepting
/// notifications.
pub async fn pump_json_lines<R>(mut reader: R, worker: &WorkerHandle) -> SourceStats
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = SourceStats::default();
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => stats.lines += 1,
            Err(e) => {
                error!(line = stats.lines + 1, error = %e, "Failed to read notification input");
                break;
            }
        }

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<TransitionNotification>(&line) {
            Ok(notification) => {
                if let Err(e) = worker.submit(notification).await {
                    error!(line = stats.lines, error = %e, "Transition worker stopped accepting input");
                    break;
                }
                stats.submitted += 1;
            }
            Err(e) => {
                stats.skipped += 1;
                warn!(line = stats.lines, error = %e, "Skipping malformed notification");
            }
        }
    }

    stats
}
