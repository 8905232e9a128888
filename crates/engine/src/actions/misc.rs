// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `edge`, `replace`, `set`, `unset`, `strptime`, `timewindow`, `drop`
//! (spec §4.2).

use crate::error::EngineError;
use crate::outcome::Outcome;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use logshipper_core::{Context, Message, Phase, Template, Value};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// `edge`: de-duplicates on a templated key within a bounded, LRU-evicted
/// backlog (spec §4.2, §9 tie-break note).
pub(crate) struct EdgeAction {
    pub key: Template,
    pub backlog: usize,
    pub phase: Phase,
    // (key, last-touched monotonic tick); front = most recently touched.
    seen: Mutex<VecDeque<(String, u64)>>,
    tick: std::sync::atomic::AtomicU64,
}

impl EdgeAction {
    pub fn new(key: Template, backlog: usize, phase: Phase) -> Self {
        Self {
            key,
            backlog: backlog.max(1),
            phase,
            seen: Mutex::new(VecDeque::new()),
            tick: std::sync::atomic::AtomicU64::new(0),
        }
    }
}

impl super::Action for EdgeAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let key = self.key.render_text(message, ctx)?;
        let now = self
            .tick
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let mut seen = self.seen.lock();
        if let Some(pos) = seen.iter().position(|(k, _)| *k == key) {
            seen.remove(pos);
            seen.push_back((key, now));
            return Ok(Outcome::SkipStep);
        }

        if seen.len() >= self.backlog {
            // Evict the oldest tick; ties broken by the lexicographically
            // smaller key (spec §9 "edge eviction" open question).
            let min_tick = seen.iter().map(|(_, t)| *t).min().unwrap_or(0);
            let evict_idx = seen
                .iter()
                .enumerate()
                .filter(|(_, (_, t))| *t == min_tick)
                .min_by(|(_, (a, _)), (_, (b, _))| a.cmp(b))
                .map(|(i, _)| i);
            if let Some(idx) = evict_idx {
                seen.remove(idx);
            }
        }
        seen.push_back((key, now));
        Ok(Outcome::Continue)
    }
}

/// `replace`: substitutes the matched span recorded by a prior `match`
/// with an interpolated template (spec §4.2).
pub(crate) struct ReplaceAction {
    pub replacement: Template,
    pub phase: Phase,
}

impl super::Action for ReplaceAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let replacement = self.replacement.render_text(message, ctx)?;
        let field = ctx
            .match_field
            .clone()
            .ok_or_else(|| EngineError::Runtime("replace requires a prior single-field match".into()))?;
        let field_match = ctx
            .matches
            .get(&field)
            .cloned()
            .ok_or_else(|| EngineError::Runtime("replace found no recorded match span".into()))?;

        if let Some(text) = message.get_text(&field).map(str::to_string) {
            let mut rewritten = String::with_capacity(text.len());
            rewritten.push_str(&text[..field_match.start]);
            rewritten.push_str(&replacement);
            rewritten.push_str(&text[field_match.end..]);
            message.set(field, Value::Text(rewritten));
        }
        Ok(Outcome::Continue)
    }
}

/// `set`: writes each interpolated template into the named field.
pub(crate) struct SetAction {
    pub fields: Vec<(String, Template)>,
    pub phase: Phase,
}

impl super::Action for SetAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        for (field, template) in &self.fields {
            let value = template.render(message, ctx)?;
            message.set(field.clone(), value);
        }
        Ok(Outcome::Continue)
    }
}

/// `unset`: removes named fields if present, silently otherwise.
pub(crate) struct UnsetAction {
    pub fields: Vec<String>,
    pub phase: Phase,
}

impl super::Action for UnsetAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, _ctx: &mut Context) -> Result<Outcome, EngineError> {
        for field in &self.fields {
            message.unset(field);
        }
        Ok(Outcome::Continue)
    }
}

/// `strptime`: parses a field's text into a timestamp (spec §4.2).
pub(crate) struct StrptimeAction {
    pub field: String,
    pub format: Option<String>,
    /// Fixed offset (minutes east of UTC) applied when the parsed value is
    /// naive and no format-embedded offset was present.
    pub assume_offset_minutes: i32,
    pub phase: Phase,
}

impl super::Action for StrptimeAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, _ctx: &mut Context) -> Result<Outcome, EngineError> {
        let text = match message.get_text(&self.field) {
            Some(t) => t.to_string(),
            None => return Ok(Outcome::Continue),
        };

        let parsed = match &self.format {
            Some(fmt) => parse_with_format(&text, fmt),
            None => parse_fuzzy(&text),
        };

        let parsed = parsed.ok_or_else(|| {
            EngineError::Runtime(format!("strptime: could not parse '{text}' on field '{}'", self.field))
        })?;

        let with_zone = match parsed {
            ParsedInstant::Aware(dt) => dt,
            ParsedInstant::Naive(naive) => {
                let clamped_minutes = self.assume_offset_minutes.clamp(-1439, 1439);
                let offset = chrono::FixedOffset::east_opt(clamped_minutes * 60)
                    .unwrap_or_else(|| chrono::Offset::fix(&Utc));
                offset
                    .from_local_datetime(&naive)
                    .single()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
            }
        };

        message.set(self.field.clone(), Value::Timestamp(with_zone));
        Ok(Outcome::Continue)
    }
}

enum ParsedInstant {
    Aware(DateTime<Utc>),
    Naive(NaiveDateTime),
}

fn parse_with_format(text: &str, format: &str) -> Option<ParsedInstant> {
    if let Ok(dt) = DateTime::parse_from_str(text, format) {
        return Some(ParsedInstant::Aware(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .map(ParsedInstant::Naive)
}

/// A deliberately small fallback set of common log timestamp shapes,
/// tried in order. Not a general fuzzy-date parser (spec §4.2 allows
/// either an explicit format or "a fuzzy date parser"; this target
/// substitutes a fixed format ladder rather than embedding one).
fn parse_fuzzy(text: &str) -> Option<ParsedInstant> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedInstant::Aware(dt.with_timezone(&Utc)));
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%b %d %H:%M:%S",
        "%d/%b/%Y:%H:%M:%S %z",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(ParsedInstant::Aware(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ParsedInstant::Naive(naive));
        }
    }
    None
}

/// `timewindow`: drops messages whose timestamp falls outside
/// `[now - lower, now + upper]` (spec §4.2).
pub(crate) struct TimewindowAction {
    pub lower: chrono::Duration,
    pub upper: chrono::Duration,
    pub phase: Phase,
}

impl super::Action for TimewindowAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, _ctx: &mut Context) -> Result<Outcome, EngineError> {
        let Some(ts) = message
            .get(logshipper_core::message::FIELD_TIMESTAMP)
            .and_then(Value::as_timestamp)
        else {
            return Ok(Outcome::Continue);
        };
        let now = Utc::now();
        let lower_bound = now - self.lower;
        let upper_bound = now + self.upper;
        if ts < lower_bound || ts > upper_bound {
            Ok(Outcome::SkipStep)
        } else {
            Ok(Outcome::Continue)
        }
    }
}

/// `drop`: unconditionally drops the message (spec §4.2, §11 supplemented
/// feature: this target only implements the parameterless unconditional
/// form, not the historical truth-value-parsed conditional form).
pub(crate) struct DropAction {
    pub phase: Phase,
}

impl super::Action for DropAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, _message: &mut Message, _ctx: &mut Context) -> Result<Outcome, EngineError> {
        Ok(Outcome::DropMessage)
    }
}

#[cfg(test)]
#[path = "misc_tests.rs"]
mod tests;
