// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete message sources (spec §4.4): file tailer, syslog TCP listener,
//! command runner, stdin. Each exposes a `spawn` constructor that binds an
//! [`Emitter`](crate::emitter::Emitter) and starts its worker task
//! immediately — "start() launches a worker task once (idempotent)" is
//! satisfied by spawning exactly once, at construction.

pub mod command;
pub mod file_tail;
pub mod stdin;
pub mod syslog;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running input's lifecycle handle. Dropping it leaks the worker task;
/// callers that need a clean shutdown must call [`InputHandle::stop`].
pub struct InputHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl InputHandle {
    pub(crate) fn new(shutdown: oneshot::Sender<()>, join: JoinHandle<()>) -> Self {
        Self {
            shutdown: Some(shutdown),
            join: Some(join),
        }
    }

    /// Signals termination, unblocks I/O, and joins the worker (spec §4.4
    /// "stop() signals termination, unblocks I/O, joins the worker").
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.join.take() {
            let _ = handle.await;
        }
    }
}
