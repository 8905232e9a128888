// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wires every core action name (spec §4.2) to a factory that parses its
//! declarative YAML parameters and returns a boxed handler. Grounded on
//! the teacher's `prepare_*` functions: a bare scalar is a shorthand for
//! the common case, a mapping spells out every parameter.

use crate::actions::{
    Action, CallAction, DebugAction, DropAction, EdgeAction, ElasticsearchAction, ExtractAction, ForkAction,
    JumpAction, LoggingAction, MatchAction, RabbitmqAction, RealWriter, ReplaceAction, SetAction, StatsdAction,
    StdoutAction, StrptimeAction, TimewindowAction, UnsetAction,
};
use crate::error::EngineError;
use crate::registry::Registry;
use crate::sinks::{ElasticsearchSink, LoggingSink, RabbitmqSink, StatsdKind, StatsdSink};
use logshipper_core::{
    message::{FIELD_MESSAGE, FIELD_TIMESTAMP},
    Phase, Template, Value,
};
use std::sync::Arc;

/// The concrete sink implementations `statsd`/`rabbitmq`/`elasticsearch_http`/
/// `logging` dispatch to. The engine only knows the trait; `logshipper-adapters`
/// supplies the protocol.
pub struct BuiltinsContext {
    pub statsd: Arc<dyn StatsdSink>,
    pub rabbitmq: Arc<dyn RabbitmqSink>,
    pub elasticsearch: Arc<dyn ElasticsearchSink>,
    pub logging: Arc<dyn LoggingSink>,
}

fn param_err(action: &str, message: impl Into<String>) -> EngineError {
    EngineError::InvalidParams {
        action: action.to_string(),
        message: message.into(),
    }
}

fn as_mapping<'a>(action: &str, params: &'a serde_yaml::Value) -> Result<&'a serde_yaml::Mapping, EngineError> {
    params
        .as_mapping()
        .ok_or_else(|| param_err(action, "expected a mapping"))
}

fn mapping_get<'a>(mapping: &'a serde_yaml::Mapping, key: &str) -> Option<&'a serde_yaml::Value> {
    mapping.iter().find_map(|(k, v)| (k.as_str() == Some(key)).then_some(v))
}

fn compile_template(action: &str, value: &serde_yaml::Value) -> Result<Template, EngineError> {
    Template::compile(&Value::from(value.clone())).map_err(|e| param_err(action, e.to_string()))
}

fn field_patterns(action: &str, params: &serde_yaml::Value) -> Result<Vec<crate::actions::FieldPattern>, EngineError> {
    let mapping = match params {
        serde_yaml::Value::String(pattern) => {
            let mut m = serde_yaml::Mapping::new();
            m.insert(serde_yaml::Value::String(FIELD_MESSAGE.to_string()), serde_yaml::Value::String(pattern.clone()));
            m
        }
        serde_yaml::Value::Mapping(m) => m.clone(),
        _ => return Err(param_err(action, "expected a string or a field→pattern mapping")),
    };

    mapping
        .iter()
        .map(|(k, v)| {
            let field = k
                .as_str()
                .ok_or_else(|| param_err(action, "field names must be strings"))?
                .to_string();
            let pattern = v
                .as_str()
                .ok_or_else(|| param_err(action, "patterns must be strings"))?;
            let regex = regex::Regex::new(pattern).map_err(EngineError::Regex)?;
            Ok(crate::actions::FieldPattern { field, regex })
        })
        .collect()
}

fn parse_delta(action: &str, text: &str) -> Result<chrono::Duration, EngineError> {
    // Delta grammar: ([Nd][Nh][Nm][N(.N)?s]) — spec §4.2 `timewindow`.
    let mut remaining = text.trim();
    let mut total = chrono::Duration::zero();
    let mut any = false;

    for (suffix, to_duration) in [
        ('d', (|n: f64| chrono::Duration::seconds((n * 86400.0) as i64)) as fn(f64) -> chrono::Duration),
        ('h', |n| chrono::Duration::seconds((n * 3600.0) as i64)),
        ('m', |n| chrono::Duration::seconds((n * 60.0) as i64)),
        ('s', |n| chrono::Duration::milliseconds((n * 1000.0) as i64)),
    ] {
        if let Some(pos) = remaining.find(suffix) {
            let (head, tail) = remaining.split_at(pos);
            let amount: f64 = head
                .parse()
                .map_err(|_| param_err(action, format!("invalid delta component in '{text}'")))?;
            total = total + to_duration(amount);
            remaining = &tail[1..];
            any = true;
        }
    }

    if !any || !remaining.is_empty() {
        return Err(param_err(action, format!("invalid delta '{text}'")));
    }
    Ok(total)
}

fn parse_field_list(action: &str, params: &serde_yaml::Value) -> Result<Vec<String>, EngineError> {
    match params {
        serde_yaml::Value::String(s) => Ok(s.split(',').map(|f| f.trim().to_string()).filter(|f| !f.is_empty()).collect()),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| param_err(action, "expected a string")))
            .collect(),
        _ => Err(param_err(action, "expected a comma-separated string or a sequence")),
    }
}

/// Registers the core action set into `registry` (spec §4.2).
pub fn register_builtins(registry: &mut Registry, ctx: BuiltinsContext) {
    registry.register(
        "match",
        Box::new(|params| {
            let fields = field_patterns("match", params)?;
            Ok(Box::new(MatchAction { fields, phase: Phase::MATCH }) as Box<dyn Action>)
        }),
    );

    registry.register(
        "extract",
        Box::new(|params| {
            let fields = field_patterns("extract", params)?;
            Ok(Box::new(ExtractAction { fields, phase: Phase::MATCH }) as Box<dyn Action>)
        }),
    );

    registry.register(
        "edge",
        Box::new(|params| {
            let (key_value, backlog) = match params {
                serde_yaml::Value::Mapping(m) => {
                    let key = mapping_get(m, "trigger")
                        .or_else(|| mapping_get(m, "key"))
                        .ok_or_else(|| param_err("edge", "missing 'trigger'"))?;
                    let backlog = mapping_get(m, "backlog").and_then(serde_yaml::Value::as_u64).unwrap_or(1) as usize;
                    (key.clone(), backlog)
                }
                other => (other.clone(), 1),
            };
            let key = compile_template("edge", &key_value)?;
            Ok(Box::new(EdgeAction::new(key, backlog, Phase::MATCH)) as Box<dyn Action>)
        }),
    );

    registry.register(
        "replace",
        Box::new(|params| {
            let replacement = compile_template("replace", params)?;
            Ok(Box::new(ReplaceAction { replacement, phase: Phase::MANIPULATE }) as Box<dyn Action>)
        }),
    );

    registry.register(
        "set",
        Box::new(|params| {
            let mapping = as_mapping("set", params)?;
            let mut fields = Vec::with_capacity(mapping.len());
            for (k, v) in mapping {
                let field = k.as_str().ok_or_else(|| param_err("set", "field names must be strings"))?.to_string();
                fields.push((field, compile_template("set", v)?));
            }
            Ok(Box::new(SetAction { fields, phase: Phase::MANIPULATE }) as Box<dyn Action>)
        }),
    );

    registry.register(
        "unset",
        Box::new(|params| {
            let fields = parse_field_list("unset", params)?;
            Ok(Box::new(UnsetAction { fields, phase: Phase::MANIPULATE }) as Box<dyn Action>)
        }),
    );

    registry.register(
        "strptime",
        Box::new(|params| {
            let (field, format, assume_offset_minutes) = match params {
                serde_yaml::Value::String(field) => (field.clone(), None, 0),
                serde_yaml::Value::Mapping(mapping) => {
                    let field = mapping_get(mapping, "field")
                        .and_then(serde_yaml::Value::as_str)
                        .unwrap_or(FIELD_MESSAGE)
                        .to_string();
                    let format = mapping_get(mapping, "format").and_then(serde_yaml::Value::as_str).map(str::to_string);
                    let assume_offset_minutes = mapping_get(mapping, "assume_offset_minutes")
                        .and_then(serde_yaml::Value::as_i64)
                        .unwrap_or(0) as i32;
                    (field, format, assume_offset_minutes)
                }
                _ => return Err(param_err("strptime", "expected a field name or {field, format}")),
            };
            Ok(Box::new(StrptimeAction { field, format, assume_offset_minutes, phase: Phase::MANIPULATE }) as Box<dyn Action>)
        }),
    );

    registry.register(
        "timewindow",
        Box::new(|params| {
            let (lower_text, upper_text) = match params {
                serde_yaml::Value::String(s) => (s.clone(), s.clone()),
                serde_yaml::Value::Mapping(m) => {
                    let lower = mapping_get(m, "lower").and_then(serde_yaml::Value::as_str).unwrap_or("1m").to_string();
                    let upper = mapping_get(m, "upper").and_then(serde_yaml::Value::as_str).unwrap_or("1m").to_string();
                    (lower, upper)
                }
                _ => return Err(param_err("timewindow", "expected a delta string or {lower, upper}")),
            };
            let lower = parse_delta("timewindow", &lower_text)?;
            let upper = parse_delta("timewindow", &upper_text)?;
            Ok(Box::new(TimewindowAction { lower, upper, phase: Phase::MATCH }) as Box<dyn Action>)
        }),
    );

    registry.register("drop", Box::new(|_params| Ok(Box::new(DropAction { phase: Phase::DROP }) as Box<dyn Action>)));

    registry.register(
        "stdout",
        Box::new(|params| {
            let format_value = match params {
                serde_yaml::Value::String(_) | serde_yaml::Value::Null => params.clone(),
                serde_yaml::Value::Mapping(m) => mapping_get(m, "format")
                    .cloned()
                    .unwrap_or_else(|| serde_yaml::Value::String(format!("{{{FIELD_MESSAGE}}}"))),
                _ => return Err(param_err("stdout", "expected a string or {format}")),
            };
            let format_value = if matches!(format_value, serde_yaml::Value::Null) {
                serde_yaml::Value::String(format!("{{{FIELD_MESSAGE}}}"))
            } else {
                format_value
            };
            let format = compile_template("stdout", &format_value)?;
            Ok(Box::new(StdoutAction { format, writer: Arc::new(RealWriter), phase: Phase::FORWARD }) as Box<dyn Action>)
        }),
    );

    registry.register(
        "debug",
        Box::new(|_params| Ok(Box::new(DebugAction { writer: Arc::new(RealWriter), phase: Phase::FORWARD }) as Box<dyn Action>)),
    );

    registry.register(
        "call",
        Box::new(|params| Ok(Box::new(CallAction { pipeline: dispatch_target("call", params)?, phase: Phase::FORWARD }) as Box<dyn Action>)),
    );

    registry.register(
        "jump",
        Box::new(|params| Ok(Box::new(JumpAction { pipeline: dispatch_target("jump", params)?, phase: Phase::FORWARD }) as Box<dyn Action>)),
    );

    registry.register(
        "fork",
        Box::new(|params| Ok(Box::new(ForkAction { pipeline: dispatch_target("fork", params)?, phase: Phase::FORWARD }) as Box<dyn Action>)),
    );

    let statsd_sink = ctx.statsd;
    registry.register(
        "statsd",
        Box::new(move |params| {
            let mapping = as_mapping("statsd", params)?;
            let name_value = mapping_get(mapping, "name").ok_or_else(|| param_err("statsd", "missing 'name'"))?;
            let name = compile_template("statsd", name_value)?;
            let value_value = mapping_get(mapping, "value").cloned().unwrap_or(serde_yaml::Value::String("1".to_string()));
            let value = compile_template("statsd", &value_value)?;
            let multiplier = mapping_get(mapping, "multiplier").and_then(serde_yaml::Value::as_f64).unwrap_or(1.0);
            let prefix = mapping_get(mapping, "prefix").and_then(serde_yaml::Value::as_str).map(str::to_string);
            let kind = match mapping_get(mapping, "type").and_then(serde_yaml::Value::as_str).unwrap_or("counter") {
                "counter" => StatsdKind::Counter,
                "gauge" => {
                    let delta = mapping_get(mapping, "delta").and_then(serde_yaml::Value::as_bool).unwrap_or(false);
                    StatsdKind::Gauge { delta }
                }
                "timer" => StatsdKind::Timer,
                other => return Err(param_err("statsd", format!("unknown type '{other}'"))),
            };
            Ok(Box::new(StatsdAction {
                sink: statsd_sink.clone(),
                name,
                value,
                kind,
                multiplier,
                prefix,
                phase: Phase::FORWARD,
            }) as Box<dyn Action>)
        }),
    );

    let rabbitmq_sink = ctx.rabbitmq;
    registry.register(
        "rabbitmq",
        Box::new(move |_params| Ok(Box::new(RabbitmqAction { sink: rabbitmq_sink.clone(), phase: Phase::FORWARD }) as Box<dyn Action>)),
    );

    let elasticsearch_sink = ctx.elasticsearch;
    registry.register(
        "elasticsearch_http",
        Box::new(move |params| {
            let mapping_opt = params.as_mapping();
            let index = match mapping_opt.and_then(|m| mapping_get(m, "index")) {
                Some(v) => compile_template("elasticsearch_http", v)?,
                None => compile_template(
                    "elasticsearch_http",
                    &serde_yaml::Value::String(format!("logshipper-{{{FIELD_TIMESTAMP}:%Y.%m.%d}}")),
                )?,
            };
            let doctype = match mapping_opt.and_then(|m| mapping_get(m, "doctype")) {
                Some(v) => compile_template("elasticsearch_http", v)?,
                None => compile_template("elasticsearch_http", &serde_yaml::Value::String("log".to_string()))?,
            };
            let id = mapping_opt
                .and_then(|m| mapping_get(m, "id"))
                .map(|v| compile_template("elasticsearch_http", v))
                .transpose()?;
            Ok(Box::new(ElasticsearchAction {
                sink: elasticsearch_sink.clone(),
                index,
                doctype,
                id,
                phase: Phase::FORWARD,
            }) as Box<dyn Action>)
        }),
    );

    let logging_sink = ctx.logging;
    registry.register(
        "logging",
        Box::new(move |params| {
            let mapping = as_mapping("logging", params)?;
            let mut fields = Vec::with_capacity(mapping.len());
            for (k, v) in mapping {
                let field = k.as_str().ok_or_else(|| param_err("logging", "field names must be strings"))?.to_string();
                fields.push((field, compile_template("logging", v)?));
            }
            Ok(Box::new(LoggingAction { sink: logging_sink.clone(), fields, phase: Phase::FORWARD }) as Box<dyn Action>)
        }),
    );
}

fn dispatch_target(action: &str, params: &serde_yaml::Value) -> Result<String, EngineError> {
    match params {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Mapping(m) => mapping_get(m, "pipeline")
            .and_then(serde_yaml::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| param_err(action, "missing 'pipeline'")),
        _ => Err(param_err(action, "expected a pipeline name or {pipeline}")),
    }
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;
