// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hand-rolled parser for the replacement-field grammar (spec §3, §4.1):
//!
//! ```text
//! field      := "{" selector ["!" conversion] [":" format_spec] "}"
//! selector   := positional | named
//! positional := digit+
//! named      := ident [accessor]
//! accessor   := "[" key "]" | "." attr
//! conversion := "s" | "r" | "a"
//! ```
//!
//! `{{` and `}}` escape to literal `{` and `}`. `format_spec` may itself
//! contain nested `{...}` fields (e.g. `{value:{width}}`), so it is parsed
//! with the same scanner rather than treated as an opaque string.

use super::{format_spec, CompiledString, TemplateError};
use crate::context::Context;
use crate::message::Message;
use crate::value::Value;

#[derive(Debug, Clone)]
pub(crate) enum Segment {
    Literal(String),
    Field(FieldSpec),
}

#[derive(Debug, Clone)]
pub(crate) enum Selector {
    Positional(usize),
    Named(String),
    Indexed { name: String, key: String },
    Attr { name: String, attr: String },
}

#[derive(Debug, Clone)]
pub(crate) struct FieldSpec {
    selector: Selector,
    conversion: Option<char>,
    format_spec: Option<Box<CompiledString>>,
}

impl FieldSpec {
    pub(crate) fn max_positional(&self) -> Option<usize> {
        let own = match &self.selector {
            Selector::Positional(n) => Some(*n),
            _ => None,
        };
        let nested = self
            .format_spec
            .as_ref()
            .and_then(|fs| fs.max_positional);
        own.into_iter().chain(nested).max()
    }

    pub(crate) fn resolve(
        &self,
        message: &Message,
        ctx: &Context,
    ) -> Result<String, TemplateError> {
        let value = match &self.selector {
            Selector::Positional(idx) => {
                Value::Text(ctx.backreferences.get(*idx).cloned().unwrap_or_default())
            }
            Selector::Named(name) => lookup_backreference_or_field(name, message, ctx),
            Selector::Indexed { name, key } => {
                let base = lookup_backreference_or_field(name, message, ctx);
                base.index(key).cloned().unwrap_or(Value::Text(String::new()))
            }
            Selector::Attr { name, attr } => {
                let base = lookup_backreference_or_field(name, message, ctx);
                base.index(attr).cloned().unwrap_or(Value::Text(String::new()))
            }
        };
        let converted = match self.conversion {
            Some('s') => Value::Text(value.display_string()),
            Some('r') => Value::Text(value.repr_string()),
            Some('a') => Value::Text(value.ascii_repr_string()),
            Some(other) => {
                return Err(TemplateError::Malformed(format!(
                    "unknown conversion !{other}"
                )))
            }
            None => value,
        };

        match &self.format_spec {
            Some(spec) => {
                let spec_text = spec.render(message, ctx)?;
                format_spec::apply(&converted, &spec_text)
            }
            None => Ok(converted.display_string()),
        }
    }
}

/// Resolve a bare name: prefer a named capture group from the most recent
/// match, then fall back to a message field, then the empty string (spec
/// §9 resolves "templates referencing absent fields" to empty-string
/// interpolation, not an error).
fn lookup_backreference_or_field(name: &str, message: &Message, ctx: &Context) -> Value {
    if let Some(field_match) = &ctx.field_match {
        if let Some(text) = field_match.named.get(name) {
            return Value::Text(text.clone());
        }
    }
    message.get(name).cloned().unwrap_or(Value::Text(String::new()))
}

pub(crate) fn parse_format_string(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();
    let mut auto_index = 0usize;

    while let Some((_, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|(_, c)| *c) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|(_, c)| *c) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let field_text = take_balanced(&mut chars)?;
                let field = parse_field(&field_text, &mut auto_index)?;
                segments.push(Segment::Field(field));
            }
            '}' => {
                return Err(TemplateError::Malformed(
                    "unmatched '}' in template".to_string(),
                ))
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Consume characters up to the `}` that balances the `{` already
/// consumed by the caller, tracking nested `{...}` (which only occurs
/// inside a format spec).
fn take_balanced(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<String, TemplateError> {
    let mut depth = 1usize;
    let mut text = String::new();
    for (_, c) in chars.by_ref() {
        match c {
            '{' => {
                depth += 1;
                text.push(c);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(text);
                }
                text.push(c);
            }
            other => text.push(other),
        }
    }
    Err(TemplateError::Malformed(
        "unterminated replacement field".to_string(),
    ))
}

fn parse_field(text: &str, auto_index: &mut usize) -> Result<FieldSpec, TemplateError> {
    let (name_and_accessor, rest) = split_once_unbracketed(text, '!', ':');
    let (name_part, conversion, format_part) = match rest {
        None => (name_and_accessor, None, None),
        Some((sep, tail)) if sep == '!' => {
            let mut tail_chars = tail.chars();
            let conv = tail_chars
                .next()
                .ok_or_else(|| TemplateError::Malformed("empty conversion".to_string()))?;
            let remainder: String = tail_chars.collect();
            if let Some(spec) = remainder.strip_prefix(':') {
                (name_and_accessor, Some(conv), Some(spec.to_string()))
            } else if remainder.is_empty() {
                (name_and_accessor, Some(conv), None)
            } else {
                return Err(TemplateError::Malformed(format!(
                    "unexpected text after conversion: {remainder}"
                )));
            }
        }
        Some((_, tail)) => (name_and_accessor, None, Some(tail.to_string())),
    };

    let selector = parse_selector(name_part, auto_index)?;
    let format_spec = match format_part {
        Some(spec_src) => Some(Box::new(CompiledString::compile(&spec_src)?)),
        None => None,
    };

    Ok(FieldSpec {
        selector,
        conversion,
        format_spec,
    })
}

/// Split `text` on the first top-level `!` or `:`, returning which
/// separator matched. There is no bracket nesting to worry about for `!`
/// since conversions never appear inside `[...]`.
fn split_once_unbracketed(text: &str, a: char, b: char) -> (&str, Option<(char, &str)>) {
    for (i, c) in text.char_indices() {
        if c == a {
            return (&text[..i], Some((a, &text[i + 1..])));
        }
        if c == b {
            return (&text[..i], Some((b, &text[i + 1..])));
        }
    }
    (text, None)
}

fn parse_selector(text: &str, auto_index: &mut usize) -> Result<Selector, TemplateError> {
    if text.is_empty() {
        let idx = *auto_index;
        *auto_index += 1;
        return Ok(Selector::Positional(idx));
    }
    if let Ok(n) = text.parse::<usize>() {
        return Ok(Selector::Positional(n));
    }
    if let Some(open) = text.find('[') {
        if let Some(close) = text.find(']') {
            if close > open {
                return Ok(Selector::Indexed {
                    name: text[..open].to_string(),
                    key: text[open + 1..close].to_string(),
                });
            }
        }
        return Err(TemplateError::Malformed(format!(
            "unbalanced '[' in field '{text}'"
        )));
    }
    if let Some(dot) = text.find('.') {
        return Ok(Selector::Attr {
            name: text[..dot].to_string(),
            attr: text[dot + 1..].to_string(),
        });
    }
    Ok(Selector::Named(text.to_string()))
}
