// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The replacement-field template sublanguage used by every action (spec
//! §3 "Template", §4.1 "Template engine").
//!
//! A [`Template`] is compiled once, at configuration-load time, from a
//! [`Value`] read out of the pipeline document. Compiling analyses string
//! scalars for `{...}` replacement fields so that interpolation against a
//! message/context pair is a flat walk with no re-parsing — interpolation
//! is the per-message hot path (§4.1 rationale).

mod format_spec;
mod parser;

use crate::context::Context;
use crate::message::Message;
use crate::value::Value;
use indexmap::IndexMap;
use thiserror::Error;

pub(crate) use parser::{parse_format_string, Segment};

/// Errors raised while compiling or interpolating a template.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    /// A positional back-reference (`{N}`) was used with fewer than `N+1`
    /// back-references available in the context (spec §3, §7
    /// "template-underflow", testable property 4).
    #[error("template references backreference {index}, but only {available} are available")]
    Underflow { index: usize, available: usize },
    #[error("malformed replacement field: {0}")]
    Malformed(String),
}

/// A compiled interpolator. See the module docs for the compile/interpolate
/// split.
#[derive(Debug, Clone)]
pub enum Template {
    /// A string scalar, compiled into literal/field segments.
    Text(CompiledString),
    /// Any other scalar (number, bool, null): interpolates to itself
    /// (spec §3 "Template").
    Literal(Value),
    Seq(Vec<Template>),
    Map(IndexMap<String, Template>),
}

/// A string scalar compiled into alternating literal text and replacement
/// fields.
#[derive(Debug, Clone)]
pub struct CompiledString {
    segments: Vec<Segment>,
    /// Highest positional index (`{N}`) referenced anywhere in this
    /// template, including inside nested format specs. Used as a fast
    /// pre-check before walking segments at interpolation time.
    pub max_positional: Option<usize>,
}

impl Template {
    /// Compile a configuration-time [`Value`] into a reusable interpolator.
    pub fn compile(value: &Value) -> Result<Template, TemplateError> {
        match value {
            Value::Text(s) => {
                if s.contains('{') {
                    Ok(Template::Text(CompiledString::compile(s)?))
                } else {
                    Ok(Template::Literal(value.clone()))
                }
            }
            Value::Seq(items) => {
                let compiled = items
                    .iter()
                    .map(Template::compile)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Template::Seq(compiled))
            }
            Value::Map(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), Template::compile(v)?);
                }
                Ok(Template::Map(out))
            }
            other => Ok(Template::Literal(other.clone())),
        }
    }

    /// Interpolate against a message and its traversal context, producing
    /// a [`Value`] of the same shape as the compiled source (spec §3).
    pub fn render(&self, message: &Message, ctx: &Context) -> Result<Value, TemplateError> {
        match self {
            Template::Literal(v) => Ok(v.clone()),
            Template::Text(cs) => Ok(Value::Text(cs.render(message, ctx)?)),
            Template::Seq(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.render(message, ctx)?);
                }
                Ok(Value::Seq(out))
            }
            Template::Map(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), v.render(message, ctx)?);
                }
                Ok(Value::Map(out))
            }
        }
    }

    /// Convenience for templates known to interpolate to text (the common
    /// case: field names, sink names, log lines).
    pub fn render_text(&self, message: &Message, ctx: &Context) -> Result<String, TemplateError> {
        Ok(self.render(message, ctx)?.display_string())
    }
}

impl CompiledString {
    fn compile(source: &str) -> Result<Self, TemplateError> {
        let segments = parse_format_string(source)?;
        let max_positional = max_positional(&segments);
        Ok(Self {
            segments,
            max_positional,
        })
    }

    fn render(&self, message: &Message, ctx: &Context) -> Result<String, TemplateError> {
        if let Some(idx) = self.max_positional {
            if ctx.backreferences.len() <= idx {
                return Err(TemplateError::Underflow {
                    index: idx,
                    available: ctx.backreferences.len(),
                });
            }
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(&field.resolve(message, ctx)?),
            }
        }
        Ok(out)
    }
}

fn max_positional(segments: &[Segment]) -> Option<usize> {
    segments
        .iter()
        .filter_map(|s| match s {
            Segment::Field(f) => f.max_positional(),
            Segment::Literal(_) => None,
        })
        .max()
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
