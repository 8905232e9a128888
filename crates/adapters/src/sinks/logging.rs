// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Structured-log sink (spec §6 "Structured logging handler"): dispatches
//! through `tracing`, the same logging path the daemon itself uses.

use logshipper_engine::sinks::{LoggingSink, SinkError};

pub struct TracingLogSink;

impl LoggingSink for TracingLogSink {
    fn log(&self, record: serde_json::Value) -> Result<(), SinkError> {
        tracing::info!(record = %record, "logshipper sink record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_never_fails() {
        let sink = TracingLogSink;
        assert!(sink.log(serde_json::json!({"message": "hi"})).is_ok());
    }
}
