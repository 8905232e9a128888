// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The shared `emit` shim every input funnels through (spec §4.4: "every
//! emitted message passes through an `emit` shim that stamps the mandatory
//! fields").

use logshipper_core::Message;
use std::sync::Arc;

/// Downstream handler an input hands messages to, bound once at
/// construction (spec §4.4: "bind a downstream handler callable").
pub type Downstream = Arc<dyn Fn(Message) + Send + Sync>;

/// Stamps mandatory fields, then forwards to the bound downstream handler.
/// Cheap to clone; every tailed file / syslog connection / respawned
/// subprocess shares one per input.
#[derive(Clone)]
pub struct Emitter {
    hostname: Arc<str>,
    downstream: Downstream,
}

impl Emitter {
    pub fn new(hostname: impl Into<Arc<str>>, downstream: Downstream) -> Self {
        Self {
            hostname: hostname.into(),
            downstream,
        }
    }

    /// Emits a bare line of text as `message`, with `timestamp`/`hostname`
    /// defaulted (spec §3: "Inputs that cannot determine a field default
    /// them to wall-clock UTC and the local host name").
    pub fn emit_text(&self, text: impl Into<String>) {
        self.emit(Message::with_text(logshipper_core::message::FIELD_MESSAGE, text.into()));
    }

    /// Emits an already-constructed message, stamping whatever mandatory
    /// fields it's missing.
    pub fn emit(&self, mut message: Message) {
        message.stamp_mandatory(&self.hostname);
        (self.downstream)(message);
    }
}
