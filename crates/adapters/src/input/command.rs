// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed input (spec §4.4.3 "Command runner"): spawns a
//! command, ingests stdout/stderr concurrently, and respawns on a pacing
//! interval until stopped.

use crate::emitter::Emitter;
use crate::input::InputHandle;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// How the command line is invoked: a shell string (`sh -c "..."`) or an
/// argv vector run directly, matching `logshipper/input.py::Command`'s two
/// accepted forms.
#[derive(Debug, Clone)]
pub enum Invocation {
    Shell(String),
    Argv(Vec<String>),
}

/// Configuration for one command input (spec §4.4.3, enriched per
/// `logshipper/input.py::Command`'s docstring).
#[derive(Debug, Clone)]
pub struct CommandConfig {
    pub invocation: Invocation,
    /// Piece separator for stdout/stderr splitting (default `"\n"`).
    pub separator: String,
    /// Seconds to wait between the process exiting and respawning, net of
    /// the time the process itself ran.
    pub interval: Duration,
    /// Extends the default clean environment (`LC_ALL=C`) with overrides
    /// (spec §6 "Environment").
    pub env: BTreeMap<String, String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            invocation: Invocation::Shell(String::new()),
            separator: "\n".to_string(),
            interval: Duration::from_secs(0),
            env: BTreeMap::new(),
        }
    }
}

/// Starts the respawn loop. Runs until [`InputHandle::stop`] is called, at
/// which point the current child (if any) is killed.
pub fn spawn(config: CommandConfig, emitter: Emitter) -> InputHandle {
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();

    let join = tokio::spawn(async move {
        loop {
            let started = Instant::now();
            let mut child = match build_command(&config).spawn() {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(error = %e, "command input failed to spawn");
                    child_respawn_sleep(&config, started, &mut shutdown_rx).await;
                    continue;
                }
            };

            let stdout = child.stdout.take();
            let stderr = child.stderr.take();
            let separator = config.separator.clone();

            let stdout_task = stdout.map(|pipe| tokio::spawn(drain_piece_stream(pipe, separator.clone(), emitter.clone())));
            let stderr_task = stderr.map(|pipe| tokio::spawn(drain_piece_stream(pipe, separator.clone(), emitter.clone())));

            tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(status) => tracing::info!(?status, "command input process exited"),
                        Err(e) => tracing::warn!(error = %e, "command input wait failed"),
                    }
                }
                _ = &mut shutdown_rx => {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    break;
                }
            }

            if let Some(t) = stdout_task {
                let _ = t.await;
            }
            if let Some(t) = stderr_task {
                let _ = t.await;
            }

            child_respawn_sleep(&config, started, &mut shutdown_rx).await;
        }
    });

    InputHandle::new(shutdown_tx, join)
}

async fn child_respawn_sleep(config: &CommandConfig, started: Instant, shutdown_rx: &mut tokio::sync::oneshot::Receiver<()>) {
    let elapsed = started.elapsed();
    let remaining = config.interval.saturating_sub(elapsed);
    if remaining.is_zero() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(remaining) => {}
        _ = shutdown_rx => {}
    }
}

fn build_command(config: &CommandConfig) -> Command {
    let mut cmd = match &config.invocation {
        Invocation::Shell(line) => {
            let mut c = Command::new("sh");
            c.arg("-c").arg(line);
            c
        }
        Invocation::Argv(argv) => {
            let mut c = Command::new(argv.first().map(String::as_str).unwrap_or("true"));
            c.args(argv.iter().skip(1));
            c
        }
    };
    cmd.env_clear();
    cmd.env("LC_ALL", "C");
    for (key, value) in &config.env {
        cmd.env(key, value);
    }
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd
}

/// Reads a pipe to EOF, splitting decoded UTF-8 on `separator`; a trailing
/// partial fragment (no separator reached before EOF) is still emitted,
/// matching "a trailing partial fragment is emitted on process termination".
async fn drain_piece_stream(mut pipe: impl tokio::io::AsyncRead + Unpin, separator: String, emitter: Emitter) {
    let mut buf = String::new();
    let mut chunk = [0u8; 4096];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.push_str(&String::from_utf8_lossy(&chunk[..n])),
            Err(e) => {
                tracing::warn!(error = %e, "command input read error");
                break;
            }
        }
        while let Some(pos) = buf.find(&separator) {
            let piece = buf[..pos].to_string();
            buf.drain(..pos + separator.len());
            emitter.emit_text(piece);
        }
    }
    if !buf.is_empty() {
        emitter.emit_text(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_emitter() -> (Emitter, Arc<Mutex<Vec<String>>>) {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let emitter = Emitter::new(
            "host",
            Arc::new(move |m| seen_clone.lock().unwrap().push(m.get_text("message").unwrap_or("").to_string())),
        );
        (emitter, seen)
    }

    #[tokio::test]
    async fn emits_one_message_per_line_of_stdout() {
        let (emitter, seen) = recording_emitter();
        let config = CommandConfig {
            invocation: Invocation::Shell("printf 'a\\nb\\n'".to_string()),
            interval: Duration::from_secs(60),
            ..Default::default()
        };
        let handle = spawn(config, emitter);
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop().await;

        let lines = seen.lock().unwrap().clone();
        assert!(lines.contains(&"a".to_string()));
        assert!(lines.contains(&"b".to_string()));
    }

    #[tokio::test]
    async fn emits_trailing_partial_fragment_without_separator() {
        let (emitter, seen) = recording_emitter();
        let config = CommandConfig {
            invocation: Invocation::Shell("printf 'partial'".to_string()),
            interval: Duration::from_secs(60),
            ..Default::default()
        };
        let handle = spawn(config, emitter);
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop().await;

        assert!(seen.lock().unwrap().contains(&"partial".to_string()));
    }
}
