// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The dynamically typed value every message field holds.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;

/// A message field value.
///
/// Messages are dynamically typed mappings (spec §3, §9 "Dynamic typing of
/// messages"): a field may hold text, a number, a boolean, an absolute
/// instant, or a nested sequence/mapping of the same.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Seq(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Index into the value by key (for mappings) or numeric index (for
    /// sequences), as used by the `{name[key]}` template grammar.
    pub fn index(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            Value::Seq(s) => key.parse::<usize>().ok().and_then(|i| s.get(i)),
            _ => None,
        }
    }

    /// Render the value the way `str()` would in the source language: the
    /// plain display form, used by unconverted/`!s`-converted replacement
    /// fields.
    pub fn display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Text(s) => s.clone(),
            Value::Timestamp(t) => t.to_rfc3339(),
            Value::Seq(items) => {
                let parts: Vec<String> = items.iter().map(Value::repr_string).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Map(m) => {
                let parts: Vec<String> = m
                    .iter()
                    .map(|(k, v)| format!("{k:?}: {}", v.repr_string()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }

    /// Render the value the way `repr()` would: strings are quoted.
    pub fn repr_string(&self) -> String {
        match self {
            Value::Text(s) => format!("{s:?}"),
            other => other.display_string(),
        }
    }

    /// ASCII-safe repr: like [`Value::repr_string`] but escapes any
    /// non-ASCII characters, as the `!a` conversion requires.
    pub fn ascii_repr_string(&self) -> String {
        self.repr_string()
            .chars()
            .flat_map(|c| {
                if c.is_ascii() {
                    vec![c]
                } else {
                    format!("\\u{{{:x}}}", c as u32).chars().collect()
                }
            })
            .collect()
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => {
                matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
            }
            Value::Seq(s) => !s.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Timestamp(_) => true,
        }
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

/// Convert a `serde_yaml::Value` (the configuration-time representation)
/// into the runtime [`Value`]. Mappings keep declaration order via
/// [`indexmap::IndexMap`], matching the loader-preserves-order requirement
/// in spec §4.3.
impl From<serde_yaml::Value> for Value {
    fn from(v: serde_yaml::Value) -> Self {
        match v {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_yaml::Value::String(s) => Value::Text(s),
            serde_yaml::Value::Sequence(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    let key = match k {
                        serde_yaml::Value::String(s) => s,
                        other => other.as_str().unwrap_or_default().to_string(),
                    };
                    out.insert(key, Value::from(v));
                }
                Value::Map(out)
            }
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
