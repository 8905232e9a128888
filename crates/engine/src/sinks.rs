// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform, opaque sink interface (spec §6 "Sinks"): the engine only
//! guarantees the action contract, concrete protocols (StatsD wire format,
//! AMQP framing, Elasticsearch HTTP) live in `logshipper-adapters`.
//!
//! Sink methods are synchronous by design, the same way the teacher's
//! `steps.rs` handlers are synchronous: a concrete sink that needs
//! asynchronous I/O bridges it internally (a bounded channel feeding a
//! background task), the way the teacher's `adapters::notify::bus` bridges
//! a synchronous publish call onto an async-delivered event stream. This
//! keeps action execution — and therefore step/pipeline testing — free of
//! an async runtime dependency.

use std::fmt;

#[derive(Debug, Clone)]
pub struct SinkError(pub String);

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SinkError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsdKind {
    Counter,
    Gauge { delta: bool },
    Timer,
}

#[derive(Debug, Clone)]
pub struct StatsdMetric {
    pub name: String,
    pub value: f64,
    pub kind: StatsdKind,
    pub multiplier: f64,
}

pub trait StatsdSink: Send + Sync {
    fn emit(&self, metric: StatsdMetric) -> Result<(), SinkError>;
}

pub trait RabbitmqSink: Send + Sync {
    /// Publishes one JSON-serialised message (spec §6 "publishes one
    /// JSON-serialised message per invocation").
    fn publish(&self, body: serde_json::Value) -> Result<(), SinkError>;
}

pub trait ElasticsearchSink: Send + Sync {
    /// PUTs `document` to `{index}/{doctype}/{id}` (spec §6).
    fn put_document(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
        document: serde_json::Value,
    ) -> Result<(), SinkError>;
}

pub trait LoggingSink: Send + Sync {
    /// Dispatches a log record built from templated fields to a
    /// user-configured handler (spec §6 "Structured logging handler").
    fn log(&self, record: serde_json::Value) -> Result<(), SinkError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fakes {
    use super::*;
    use parking_lot::Mutex;

    /// Records every call instead of performing I/O, for action-level unit
    /// tests (mirrors the teacher's `FakeNotifyBus`/`NoOpSession` doubles).
    #[derive(Default)]
    pub struct RecordingSink<T> {
        pub calls: Mutex<Vec<T>>,
    }

    impl<T> RecordingSink<T> {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl StatsdSink for RecordingSink<StatsdMetric> {
        fn emit(&self, metric: StatsdMetric) -> Result<(), SinkError> {
            self.calls.lock().push(metric);
            Ok(())
        }
    }

    impl RabbitmqSink for RecordingSink<serde_json::Value> {
        fn publish(&self, body: serde_json::Value) -> Result<(), SinkError> {
            self.calls.lock().push(body);
            Ok(())
        }
    }

    impl ElasticsearchSink for RecordingSink<(String, String, String, serde_json::Value)> {
        fn put_document(
            &self,
            index: &str,
            doctype: &str,
            id: &str,
            document: serde_json::Value,
        ) -> Result<(), SinkError> {
            self.calls
                .lock()
                .push((index.to_string(), doctype.to_string(), id.to_string(), document));
            Ok(())
        }
    }

    impl LoggingSink for RecordingSink<serde_json::Value> {
        fn log(&self, record: serde_json::Value) -> Result<(), SinkError> {
            self.calls.lock().push(record);
            Ok(())
        }
    }
}
