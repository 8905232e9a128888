// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Turns one [`InputDef`]'s declarative YAML parameters into a running
//! [`InputHandle`], and builds the concrete sink set a [`BuiltinsContext`]
//! needs (spec §4.5 "rebuilds inputs", §6 "Sinks").

use crate::error::ManagerError;
use logshipper_adapters::input::{command, file_tail, stdin, syslog};
use logshipper_adapters::sinks::{elasticsearch::ElasticsearchHttpSink, logging::TracingLogSink, rabbitmq::RabbitmqLoggedSink, statsd::StatsdUdpSink};
use logshipper_adapters::{Emitter, InputHandle};
use logshipper_config::InputDef;
use logshipper_engine::builtins::BuiltinsContext;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Where each built-in sink action sends its output. The manager owns one
/// set of sink connections shared by every pipeline it loads.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub statsd_target: SocketAddr,
    pub elasticsearch_base_url: String,
    pub rabbitmq_exchange: String,
    pub rabbitmq_routing_key: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            statsd_target: SocketAddr::from(([127, 0, 0, 1], 8125)),
            elasticsearch_base_url: "http://127.0.0.1:9200".to_string(),
            rabbitmq_exchange: "logshipper".to_string(),
            rabbitmq_routing_key: "logshipper".to_string(),
        }
    }
}

impl SinkConfig {
    pub(crate) fn into_builtins_context(self) -> Result<BuiltinsContext, ManagerError> {
        let statsd = StatsdUdpSink::connect(self.statsd_target)?;
        let elasticsearch = ElasticsearchHttpSink::spawn(self.elasticsearch_base_url);
        let rabbitmq = RabbitmqLoggedSink {
            exchange: self.rabbitmq_exchange,
            routing_key: self.rabbitmq_routing_key,
        };

        Ok(BuiltinsContext {
            statsd: Arc::new(statsd),
            rabbitmq: Arc::new(rabbitmq),
            elasticsearch: Arc::new(elasticsearch),
            logging: Arc::new(TracingLogSink),
        })
    }
}

/// Dispatches one [`InputDef`] to its concrete adapter by name (spec §6
/// "Configuration document": `inputs` is a `name → params` mapping).
pub(crate) async fn spawn_input(def: &InputDef, emitter: Emitter) -> Result<InputHandle, String> {
    match def.name.as_str() {
        "stdin" => Ok(stdin::spawn(emitter)),
        "command" => {
            let config = parse_command_config(&def.params)?;
            Ok(command::spawn(config, emitter))
        }
        "syslog" => {
            let config = parse_syslog_config(&def.params)?;
            syslog::spawn(config, emitter).await.map_err(|e| e.to_string())
        }
        "file_tail" => {
            let config = parse_file_tail_config(&def.params)?;
            Ok(file_tail::spawn(config, emitter))
        }
        other => Err(format!("unknown input type '{other}'")),
    }
}

fn as_mapping(params: &serde_yaml::Value) -> Option<&serde_yaml::Mapping> {
    params.as_mapping()
}

fn get<'a>(mapping: &'a serde_yaml::Mapping, key: &str) -> Option<&'a serde_yaml::Value> {
    mapping.iter().find_map(|(k, v)| (k.as_str() == Some(key)).then_some(v))
}

fn string_list(value: &serde_yaml::Value) -> Vec<String> {
    match value {
        serde_yaml::Value::String(s) => vec![s.clone()],
        serde_yaml::Value::Sequence(items) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    }
}

fn parse_file_tail_config(params: &serde_yaml::Value) -> Result<file_tail::FileTailConfig, String> {
    let patterns = match params {
        serde_yaml::Value::Mapping(m) => get(m, "patterns")
            .map(string_list)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| "file_tail requires a 'patterns' string or sequence".to_string())?,
        other => {
            let patterns = string_list(other);
            if patterns.is_empty() {
                return Err("file_tail expects a path, a sequence of paths, or a mapping with 'patterns'".to_string());
            }
            patterns
        }
    };
    Ok(file_tail::FileTailConfig { patterns })
}

fn parse_syslog_config(params: &serde_yaml::Value) -> Result<syslog::SyslogConfig, String> {
    let mapping = as_mapping(params).ok_or_else(|| "syslog requires a mapping".to_string())?;
    let bind_text = get(mapping, "bind").and_then(|v| v.as_str()).unwrap_or("0.0.0.0:514");
    let bind = bind_text
        .parse()
        .map_err(|e| format!("invalid syslog bind address '{bind_text}': {e}"))?;
    let mode = match get(mapping, "mode").and_then(|v| v.as_str()) {
        Some("rfc5424") => syslog::SyslogMode::Rfc5424,
        Some("rfc3164") => syslog::SyslogMode::Rfc3164,
        _ => syslog::SyslogMode::Auto,
    };
    Ok(syslog::SyslogConfig { bind, mode })
}

fn parse_command_config(params: &serde_yaml::Value) -> Result<command::CommandConfig, String> {
    let mapping = as_mapping(params).ok_or_else(|| "command requires a mapping".to_string())?;

    let invocation = match get(mapping, "argv") {
        Some(serde_yaml::Value::Sequence(items)) => {
            command::Invocation::Argv(items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        }
        _ => {
            let line = get(mapping, "command")
                .and_then(|v| v.as_str())
                .ok_or_else(|| "command requires a 'command' string or an 'argv' sequence".to_string())?;
            command::Invocation::Shell(line.to_string())
        }
    };

    let separator = get(mapping, "separator").and_then(|v| v.as_str()).unwrap_or("\n").to_string();
    let interval_secs = get(mapping, "interval").and_then(|v| v.as_f64()).unwrap_or(0.0);
    let env = match get(mapping, "env") {
        Some(serde_yaml::Value::Mapping(m)) => m
            .iter()
            .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.as_str()?.to_string())))
            .collect(),
        _ => BTreeMap::new(),
    };

    Ok(command::CommandConfig {
        invocation,
        separator,
        interval: Duration::from_secs_f64(interval_secs),
        env,
    })
}
