// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The message: a mapping from field name to [`Value`] carried through a
//! pipeline (spec §3 "Message").

use crate::value::Value;
use chrono::Utc;
use indexmap::IndexMap;

/// Field name always present on a message emitted by any input.
pub const FIELD_MESSAGE: &str = "message";
/// Field name always present on a message emitted by any input.
pub const FIELD_TIMESTAMP: &str = "timestamp";
/// Field name always present on a message emitted by any input.
pub const FIELD_HOSTNAME: &str = "hostname";

/// A mapping from string field names to dynamically typed values.
///
/// Invariant 1 (spec §3): every message handed to `emit` gains the three
/// mandatory fields before it reaches a pipeline. [`Message::stamp_mandatory`]
/// is the single place that enforces this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: IndexMap<String, Value>,
}

impl Message {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    pub fn with_text(field: impl Into<String>, text: impl Into<String>) -> Self {
        let mut m = Self::new();
        m.set(field, Value::Text(text.into()));
        m
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_text)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn unset(&mut self, field: &str) {
        self.fields.shift_remove(field);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Ensure the three mandatory fields are present, defaulting
    /// `timestamp` to wall-clock UTC and `hostname` to the local host name
    /// when an input could not determine them (spec §3).
    pub fn stamp_mandatory(&mut self, local_hostname: &str) {
        if !self.contains(FIELD_MESSAGE) {
            self.set(FIELD_MESSAGE, Value::Text(String::new()));
        }
        if !self.contains(FIELD_TIMESTAMP) {
            self.set(FIELD_TIMESTAMP, Value::Timestamp(Utc::now()));
        }
        if !self.contains(FIELD_HOSTNAME) {
            self.set(FIELD_HOSTNAME, Value::Text(local_hostname.to_string()));
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
