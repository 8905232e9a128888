// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! RFC-3164 / RFC-5424 TCP syslog listener (spec §4.4.2).

use crate::emitter::Emitter;
use crate::input::InputHandle;
use chrono::{DateTime, NaiveDateTime, Utc};
use logshipper_core::{Message, Value};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;

/// Severity names indexed by `prival % 8` (carried verbatim from the
/// Python original's `SYSLOG_PRIORITIES`).
pub const SYSLOG_SEVERITIES: [&str; 8] = [
    "emergency", "alert", "critical", "error", "warning", "notice", "informational", "debug",
];

/// Facility names indexed by `prival / 8` (carried verbatim from the
/// Python original's `SYSLOG_FACILITIES`: 16 named facilities, then
/// `local0`..`local7`, then `unknown00`..`unknown11`).
pub fn syslog_facility(index: usize) -> String {
    const BASE: [&str; 16] = [
        "kern", "user", "mail", "daemon", "auth", "syslog", "lpr", "news", "uucp", "cron",
        "authpriv", "ftp", "ntp", "audit", "alert", "local",
    ];
    if index < BASE.len() {
        return BASE[index].to_string();
    }
    let local_index = index - BASE.len();
    if local_index < 8 {
        return format!("local{local_index}");
    }
    let unknown_index = local_index - 8;
    if unknown_index < 12 {
        return format!("unknown{unknown_index:02}");
    }
    format!("unknown{index:02}")
}

#[derive(Debug, Clone, Copy, Default)]
pub enum SyslogMode {
    #[default]
    Auto,
    Rfc5424,
    Rfc3164,
}

#[derive(Debug, Clone)]
pub struct SyslogConfig {
    pub bind: SocketAddr,
    pub mode: SyslogMode,
}

/// Binds a TCP listener and accepts connections until `stop()`; each
/// connection is read line-by-line on its own task.
pub async fn spawn(config: SyslogConfig, emitter: Emitter) -> std::io::Result<InputHandle> {
    let listener = TcpListener::bind(config.bind).await?;
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();

    let join = tokio::spawn(async move {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((socket, peer)) => {
                            let emitter = emitter.clone();
                            let mode = config.mode;
                            tokio::spawn(async move {
                                handle_connection(socket, mode, emitter).await;
                                tracing::debug!(%peer, "syslog connection closed");
                            });
                        }
                        Err(e) => tracing::warn!(error = %e, "syslog accept failed"),
                    }
                }
                _ = &mut shutdown_rx => break,
            }
        }
    });

    Ok(InputHandle::new(shutdown_tx, join))
}

async fn handle_connection(socket: tokio::net::TcpStream, mode: SyslogMode, emitter: Emitter) {
    let mut lines = BufReader::new(socket).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line, mode) {
                Some(message) => emitter.emit(message),
                None => tracing::warn!(line = %line, "syslog line matched no known format, dropped"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "syslog read error");
                break;
            }
        }
    }
}

fn parse_line(line: &str, mode: SyslogMode) -> Option<Message> {
    match mode {
        SyslogMode::Auto => parse_rfc5424(line).or_else(|| parse_rfc3164(line)),
        SyslogMode::Rfc5424 => parse_rfc5424(line),
        SyslogMode::Rfc3164 => parse_rfc3164(line),
    }
}

fn rfc5424_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^<(?P<pri>\d{1,3})>(?P<version>\d+)\s
            (?P<timestamp>\S+)\s
            (?P<hostname>\S+)\s
            (?P<appname>\S+)\s
            (?P<procid>\S+)\s
            (?P<msgid>\S+)\s
            (?P<sd>-|(?:\[[^\]]*\])+)
            \s?(?P<message>.*)$
            ",
        )
        .expect("static rfc5424 regex is valid")
    })
}

fn rfc3164_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^<(?P<pri>\d{1,3})>
            (?P<timestamp>[A-Za-z]{3}\s+\d{1,2}\s\d{2}:\d{2}:\d{2})\s
            (?P<hostname>\S+)\s
            (?P<message>.*)$
            ",
        )
        .expect("static rfc3164 regex is valid")
    })
}

fn decode_prival(prival: &str) -> Option<(String, &'static str)> {
    let prival: u32 = prival.parse().ok()?;
    let facility = syslog_facility((prival / 8) as usize);
    let severity = SYSLOG_SEVERITIES[(prival % 8) as usize];
    Some((facility, severity))
}

fn set_if_present(message: &mut Message, field: &str, value: &str) {
    if value != "-" && !value.is_empty() {
        message.set(field, Value::Text(value.to_string()));
    }
}

fn parse_rfc5424(line: &str) -> Option<Message> {
    let caps = rfc5424_regex().captures(line)?;
    let (facility, severity) = decode_prival(&caps["pri"])?;

    let mut message = Message::new();
    message.set("facility", Value::Text(facility));
    message.set("severity", Value::Text(severity.to_string()));
    message.set("message", Value::Text(caps["message"].to_string()));

    let ts = &caps["timestamp"];
    if ts != "-" {
        if let Some(instant) = parse_rfc5424_timestamp(ts) {
            message.set("timestamp", Value::Timestamp(instant));
        }
    }

    set_if_present(&mut message, "hostname", &caps["hostname"]);
    set_if_present(&mut message, "appname", &caps["appname"]);
    set_if_present(&mut message, "procid", &caps["procid"]);
    set_if_present(&mut message, "msgid", &caps["msgid"]);
    set_if_present(&mut message, "structured_data", &caps["sd"]);

    Some(message)
}

fn parse_rfc3164(line: &str) -> Option<Message> {
    let caps = rfc3164_regex().captures(line)?;
    let (facility, severity) = decode_prival(&caps["pri"])?;

    let mut message = Message::new();
    message.set("facility", Value::Text(facility));
    message.set("severity", Value::Text(severity.to_string()));
    message.set("message", Value::Text(caps["message"].to_string()));
    set_if_present(&mut message, "hostname", &caps["hostname"]);

    if let Some(instant) = parse_rfc3164_timestamp(&caps["timestamp"]) {
        message.set("timestamp", Value::Timestamp(instant));
    }

    Some(message)
}

/// Accepts ISO-8601 with optional fractional seconds and either `Z` or a
/// `±HH:MM` offset (spec §4.4.2).
fn parse_rfc5424_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// RFC-3164 timestamps carry no year; the current UTC year is assumed.
fn parse_rfc3164_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let normalized: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let year = Utc::now().format("%Y").to_string();
    let with_year = format!("{year} {normalized}");
    NaiveDateTime::parse_from_str(&with_year, "%Y %b %e %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
