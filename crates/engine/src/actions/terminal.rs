// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `stdout`, `debug` (spec §4.2): terminal sinks that write to standard
//! output rather than an external system.

use crate::error::EngineError;
use crate::outcome::Outcome;
use logshipper_core::{Context, Message, Phase, Template};
#[cfg(test)]
use logshipper_core::Value;
#[cfg(test)]
use parking_lot::Mutex;
use std::io::Write;

/// Where `stdout`/`debug` actually write. Swapped for a buffer in tests so
/// assertions don't depend on captured process output.
pub(crate) trait Writer: Send + Sync {
    fn write_line(&self, line: &str);
}

pub(crate) struct RealWriter;

impl Writer for RealWriter {
    fn write_line(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    }
}

#[cfg(test)]
pub(crate) struct BufferWriter {
    pub lines: Mutex<Vec<String>>,
}

#[cfg(test)]
impl BufferWriter {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl Writer for BufferWriter {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Writes the templated `format` string, a bare string shorthand for
/// `{format: "..."}` carried forward from the `prepare_stdout` parameter
/// shape. Default format renders the whole message.
pub(crate) struct StdoutAction {
    pub format: Template,
    pub writer: std::sync::Arc<dyn Writer>,
    pub phase: Phase,
}

impl super::Action for StdoutAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let line = self.format.render_text(message, ctx)?;
        self.writer.write_line(&line);
        Ok(Outcome::Continue)
    }
}

/// Writes the message's full field set as `repr()`-style text, a
/// developer-facing diagnostic sink distinct from `stdout`'s templated
/// output.
pub(crate) struct DebugAction {
    pub writer: std::sync::Arc<dyn Writer>,
    pub phase: Phase,
}

impl super::Action for DebugAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, _ctx: &mut Context) -> Result<Outcome, EngineError> {
        let parts: Vec<String> = message
            .iter()
            .map(|(k, v)| format!("{k}={}", v.repr_string()))
            .collect();
        self.writer.write_line(&parts.join(", "));
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
