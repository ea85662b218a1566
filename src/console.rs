//! Local console: stdin lines become commands run with the CONSOLE principal.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::commands::Principal;
use crate::dispatch::Dispatcher;

/// Read stdin on a plain thread so a pending read never holds up runtime
/// shutdown.
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    let spawned = std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Failed to start console reader");
    }
    rx
}

/// Dispatch console lines until input ends or shutdown. The sigil is optional.
pub async fn run(
    mut lines: mpsc::Receiver<String>,
    dispatcher: Arc<Dispatcher>,
    sigil: char,
    shutdown: CancellationToken,
) {
    info!("Console enabled");
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.recv() => match line {
                Some(line) => line,
                None => {
                    debug!("Console input closed");
                    break;
                }
            },
        };
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let line = line.strip_prefix(sigil).unwrap_or(line);
        dispatcher.dispatch(line, Principal::console());
    }
}
