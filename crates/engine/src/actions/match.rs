// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `match` and `extract` (spec §4.2): the only actions that populate
//! `context.matches` / `context.field_match` / `context.backreferences`.

use crate::error::EngineError;
use crate::outcome::Outcome;
use indexmap::IndexMap;
use logshipper_core::{Context, FieldMatch, Message, Phase};
use regex::Regex;

/// One compiled `field → regex` entry, in declaration order.
pub(crate) struct FieldPattern {
    pub field: String,
    pub regex: Regex,
}

/// Runs every field pattern against the message in declaration order.
/// Returns `None` on the first non-match (spec §4.2 "On first non-match
/// across any field, returns `skip-step`"). On success, returns the set of
/// per-field matches plus, when exactly one field was searched, the
/// single-field context data.
struct MatchRun {
    matches: IndexMap<String, FieldMatch>,
    named_captures: Vec<(String, String)>,
    single: Option<(String, FieldMatch)>,
}

fn perform_match(fields: &[FieldPattern], message: &Message) -> Option<MatchRun> {
    let mut matches = IndexMap::new();
    let mut named_captures = Vec::new();

    for fp in fields {
        let text = message.get_text(&fp.field).unwrap_or("");
        let captures = fp.regex.captures(text)?;
        let full = captures.get(0)?;

        let mut groups = vec![full.as_str().to_string()];
        for i in 1..captures.len() {
            groups.push(captures.get(i).map(|m| m.as_str().to_string()).unwrap_or_default());
        }

        let mut named = IndexMap::new();
        for name in fp.regex.capture_names().flatten() {
            if let Some(m) = captures.name(name) {
                named.insert(name.to_string(), m.as_str().to_string());
                named_captures.push((name.to_string(), m.as_str().to_string()));
            }
        }

        let field_match = FieldMatch {
            field: fp.field.clone(),
            start: full.start(),
            end: full.end(),
            groups,
            named,
        };
        matches.insert(fp.field.clone(), field_match);
    }

    let single = if fields.len() == 1 {
        matches.iter().next().map(|(f, m)| (f.clone(), m.clone()))
    } else {
        None
    };

    Some(MatchRun {
        matches,
        named_captures,
        single,
    })
}

fn apply_match_run(run: MatchRun, message: &mut Message, ctx: &mut Context) {
    for (name, value) in run.named_captures {
        message.set(name, logshipper_core::Value::Text(value));
    }
    if let Some((field, field_match)) = run.single {
        ctx.match_field = Some(field);
        ctx.backreferences = field_match.groups.clone();
        ctx.field_match = Some(field_match);
    }
    ctx.matches = run.matches;
}

pub(crate) struct MatchAction {
    pub fields: Vec<FieldPattern>,
    pub phase: Phase,
}

impl super::Action for MatchAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        match perform_match(&self.fields, message) {
            None => Ok(Outcome::SkipStep),
            Some(run) => {
                apply_match_run(run, message, ctx);
                Ok(Outcome::Continue)
            }
        }
    }
}

pub(crate) struct ExtractAction {
    pub fields: Vec<FieldPattern>,
    pub phase: Phase,
}

impl super::Action for ExtractAction {
    fn default_phase(&self) -> Phase {
        self.phase
    }

    fn invoke(&self, message: &mut Message, ctx: &mut Context) -> Result<Outcome, EngineError> {
        let run = match perform_match(&self.fields, message) {
            None => return Ok(Outcome::SkipStep),
            Some(run) => run,
        };

        // Elide each matched span before context is populated, since
        // elision doesn't change group text already captured.
        for (field, field_match) in &run.matches {
            let text = message.get_text(field).map(str::to_string);
            if let Some(text) = text {
                let mut rewritten = String::with_capacity(text.len());
                rewritten.push_str(&text[..field_match.start]);
                rewritten.push_str(&text[field_match.end..]);
                message.set(field.clone(), logshipper_core::Value::Text(rewritten));
            }
        }

        apply_match_run(run, message, ctx);
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
#[path = "match_tests.rs"]
mod tests;
