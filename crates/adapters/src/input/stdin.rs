// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Standard-input source: one message per line, until EOF or `stop()`.

use crate::emitter::Emitter;
use crate::input::InputHandle;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Starts reading lines from stdin, emitting one message per line.
pub fn spawn(emitter: Emitter) -> InputHandle {
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();

    let join = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line {
                        Ok(Some(text)) => emitter.emit_text(text),
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!(error = %e, "stdin read error");
                            break;
                        }
                    }
                }
                _ = &mut shutdown_rx => break,
            }
        }
    });

    InputHandle::new(shutdown_tx, join)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn stop_unblocks_the_worker_without_panicking() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let emitter = Emitter::new(
            "host",
            Arc::new(move |m| seen_clone.lock().unwrap().push(m.get_text("message").unwrap_or("").to_string())),
        );

        let handle = spawn(emitter);
        handle.stop().await;
    }
}
