// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The per-message scratchpad shared between actions of one pipeline
//! traversal (spec §3 "Context").

use crate::message::Message;
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// A single field's regex match, retained for the rest of the step so that
/// actions like `replace` can recover the matched span without re-running
/// the regex.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: String,
    /// Byte offsets of the full match within the field's text.
    pub start: usize,
    pub end: usize,
    /// Full match text (group 0) followed by numbered capture groups.
    /// Unmatched optional groups are the empty string, matching the
    /// template engine's "absent field interpolates to empty string" rule.
    pub groups: Vec<String>,
    pub named: IndexMap<String, String>,
}

/// Errors a cross-pipeline dispatch can surface to the caller (spec §7).
#[derive(Debug, Error, Clone)]
pub enum DispatchError {
    #[error("pipeline not found: {0}")]
    PipelineNotFound(String),
    #[error("recursion too deep (limit 10)")]
    RecursionTooDeep,
}

/// The manager-side half of cross-pipeline dispatch (`call`/`jump`/`fork`).
///
/// Defined here, not in the engine or daemon crate, so that [`Context`] can
/// hold a dispatch handle without the core crate depending on either of
/// them — the pipeline manager (daemon crate) implements this trait and
/// hands a trait object to each [`Context`] it constructs.
pub trait Dispatcher: Send + Sync {
    /// Synchronous dispatch, used by `call`/`jump`. Bounded by the
    /// per-chain recursion counter (spec §4.5, §4.6).
    fn process(&self, message: Message, pipeline: &str) -> Result<Message, DispatchError>;

    /// Asynchronous hand-off to the shared worker pool, used by `fork` and
    /// by every input's `emit` path. Resets the recursion counter for the
    /// new dispatch chain.
    fn process_async(&self, message: Message, pipeline: &str);
}

/// Per-message scratchpad, reset at every step boundary (spec §3, §4.3).
pub struct Context {
    pub dispatcher: Option<Arc<dyn Dispatcher>>,
    /// The single-field match, set only when `match`/`extract` matched
    /// exactly one field (spec §4.2 `match`).
    pub field_match: Option<FieldMatch>,
    pub match_field: Option<String>,
    /// Index 0 = full match, 1..K = capture groups, populated only in the
    /// single-field case.
    pub backreferences: Vec<String>,
    /// Per-field match, populated in both the single- and multi-field
    /// cases; `replace` reads spans from here.
    pub matches: IndexMap<String, FieldMatch>,
}

impl Context {
    pub fn new(dispatcher: Option<Arc<dyn Dispatcher>>) -> Self {
        Self {
            dispatcher,
            field_match: None,
            match_field: None,
            backreferences: Vec::new(),
            matches: IndexMap::new(),
        }
    }

    /// Reset match state at a step boundary (spec §4.3 step 2a).
    pub fn reset_for_step(&mut self) {
        self.field_match = None;
        self.match_field = None;
        self.backreferences.clear();
        self.matches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_match_state() {
        let mut ctx = Context::new(None);
        ctx.backreferences.push("full".into());
        ctx.match_field = Some("message".into());
        ctx.matches.insert(
            "message".into(),
            FieldMatch {
                field: "message".into(),
                start: 0,
                end: 1,
                groups: vec!["a".into()],
                named: IndexMap::new(),
            },
        );

        ctx.reset_for_step();

        assert!(ctx.backreferences.is_empty());
        assert!(ctx.match_field.is_none());
        assert!(ctx.matches.is_empty());
        assert!(ctx.field_match.is_none());
    }
}
