// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `statsd`, `rabbitmq`, `elasticsearch_http`, `logging` (spec §4.2, §6):
//! phase-FORWARD actions that template their parameters and hand the
//! result to an opaque sink trait object.

use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::sinks::{ElasticsearchSink, LoggingSink, RabbitmqSink, SinkError, StatsdKind, StatsdMetric, StatsdSink};
use indexmap::IndexMap;
use logshipper_core::{Context, Message, Phase, Template, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;

impl From<SinkError> for EngineError {
    fn from(e: SinkError) -> Self {
        EngineError::Runtime(e.0)
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
        Value::Seq(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => {
            let mut obj = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                obj.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(obj)
        }
    }
}

fn message_to_json(message: &Message) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    for (k, v) in message.iter() {
        obj.insert(k.clone(), value_to_json(v));
    }
    serde_json::Value::Object(obj)
}

fn render_f64(template: &Template, message: &Message, ctx: &Context) -> Result<f64, EngineError> {
    let rendered = template.render(message, ctx)?;
    match rendered {
        Value::Int(i) => Ok(i as f64),
        Value::Float(f) => Ok(f),
        Value::Text(s) => s
            .parse()
            .map_err(|_| EngineError::Runtime(format!("'{s}' is not numeric"))),
        other => Err(EngineError::Runtime(format!("{other} is not numeric"))),
    }
}

pub(crate) struct StatsdAction {
    pub sink: Arc<dyn StatsdSink>,
    pub name: Template,
    pub value: Template,
    pub kind: StatsdKind,
    pub multiplier: f64,
    pub prefix: Option<String>,
    pub phase: Phase,
}

impl super::Action for StatsdAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let mut name = self.name.render_text(message, ctx)?;
        if let Some(prefix) = &self.prefix {
            name = format!("{prefix}.{name}");
        }
        let value = render_f64(&self.value, message, ctx)?;
        self.sink.emit(StatsdMetric {
            name,
            value,
            kind: self.kind,
            multiplier: self.multiplier,
        })?;
        Ok(Outcome::Continue)
    }
}

pub(crate) struct RabbitmqAction {
    pub sink: Arc<dyn RabbitmqSink>,
    pub phase: Phase,
}

impl super::Action for RabbitmqAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, _ctx: &mut Context) -> Result<Outcome, EngineError> {
        self.sink.publish(message_to_json(message))?;
        Ok(Outcome::Continue)
    }
}

pub(crate) struct ElasticsearchAction {
    pub sink: Arc<dyn ElasticsearchSink>,
    pub index: Template,
    pub doctype: Template,
    pub id: Option<Template>,
    pub phase: Phase,
}

impl super::Action for ElasticsearchAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let document = message_to_json(message);
        let index = self.index.render_text(message, ctx)?;
        let doctype = self.doctype.render_text(message, ctx)?;
        let id = match &self.id {
            Some(template) => template.render_text(message, ctx)?,
            None => {
                let mut hasher = Sha256::new();
                hasher.update(document.to_string().as_bytes());
                format!("{:x}", hasher.finalize())
            }
        };
        self.sink.put_document(&index, &doctype, &id, document)?;
        Ok(Outcome::Continue)
    }
}

pub(crate) struct LoggingAction {
    pub sink: Arc<dyn LoggingSink>,
    pub fields: Vec<(String, Template)>,
    pub phase: Phase,
}

impl super::Action for LoggingAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let mut record = IndexMap::with_capacity(self.fields.len());
        for (field, template) in &self.fields {
            record.insert(field.clone(), template.render(message, ctx)?);
        }
        let json = value_to_json(&Value::Map(record));
        self.sink.log(json)?;
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
#[path = "sink_actions_tests.rs"]
mod tests;
