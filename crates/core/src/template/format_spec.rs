// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A practical subset of the `:format_spec` grammar (spec §3: "a subset of
//! common format-string conventions" — not a reimplementation of a general
//! format mini-language).
//!
//! Supported: fill+align (`<`, `>`, `^`), sign (`+`, `-`, space), zero-pad
//! (`0`), width, precision (`.N`), and a type character selecting how the
//! value is rendered (`s`, `d`, `f`/`F`, `x`/`X`, `o`, `b`, `%`). Anything
//! else in the spec string is left for a literal pass-through of the
//! display string, padded to width.

use super::TemplateError;
use crate::value::Value;

#[derive(Debug, Default)]
struct Spec {
    fill: char,
    align: Option<char>,
    sign: Option<char>,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
    ty: Option<char>,
}

pub(super) fn apply(value: &Value, spec_text: &str) -> Result<String, TemplateError> {
    if spec_text.is_empty() {
        return Ok(value.display_string());
    }
    // A timestamp's format spec is a strftime pattern, not the numeric
    // mini-language below (mirrors the source language's `datetime.__format__`,
    // which hands its spec straight to `strftime`).
    if let Value::Timestamp(instant) = value {
        return Ok(instant.format(spec_text).to_string());
    }
    let spec = parse_spec(spec_text)?;
    let body = render_typed(value, &spec)?;
    Ok(pad(&body, &spec, is_numeric_type(spec.ty)))
}

fn parse_spec(text: &str) -> Result<Spec, TemplateError> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut spec = Spec {
        fill: ' ',
        ..Spec::default()
    };

    if chars.len() >= 2 && matches!(chars[1], '<' | '>' | '^') {
        spec.fill = chars[0];
        spec.align = Some(chars[1]);
        i = 2;
    } else if !chars.is_empty() && matches!(chars[0], '<' | '>' | '^') {
        spec.align = Some(chars[0]);
        i = 1;
    }

    if i < chars.len() && matches!(chars[i], '+' | '-' | ' ') {
        spec.sign = Some(chars[i]);
        i += 1;
    }

    if i < chars.len() && chars[i] == '#' {
        i += 1; // alternate form: accepted, not rendered differently
    }

    if i < chars.len() && chars[i] == '0' {
        spec.zero_pad = true;
        i += 1;
    }

    let width_start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i > width_start {
        let width_str: String = chars[width_start..i].iter().collect();
        spec.width = width_str.parse().ok();
    }

    if i < chars.len() && (chars[i] == ',' || chars[i] == '_') {
        i += 1; // grouping separator: accepted, not rendered
    }

    if i < chars.len() && chars[i] == '.' {
        i += 1;
        let prec_start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let prec_str: String = chars[prec_start..i].iter().collect();
        spec.precision = prec_str.parse().ok();
        if spec.precision.is_none() {
            return Err(TemplateError::Malformed(format!(
                "missing precision digits in format spec '{text}'"
            )));
        }
    }

    if i < chars.len() {
        spec.ty = Some(chars[i]);
        i += 1;
    }

    if i != chars.len() {
        return Err(TemplateError::Malformed(format!(
            "trailing characters in format spec '{text}'"
        )));
    }

    Ok(spec)
}

fn render_typed(value: &Value, spec: &Spec) -> Result<String, TemplateError> {
    match spec.ty {
        None | Some('s') => {
            let mut s = value.display_string();
            if let Some(prec) = spec.precision {
                s.truncate(prec);
            }
            Ok(s)
        }
        Some('d') => {
            let n = as_i64(value)?;
            Ok(with_sign(n.unsigned_abs().to_string(), spec, n < 0))
        }
        Some('f') | Some('F') => {
            let f = as_f64(value)?;
            let prec = spec.precision.unwrap_or(6);
            Ok(with_sign(format!("{:.*}", prec, f.abs()), spec, f.is_sign_negative()))
        }
        Some('x') => {
            let n = as_i64(value)?;
            Ok(with_sign(format!("{:x}", n.unsigned_abs()), spec, n < 0))
        }
        Some('X') => {
            let n = as_i64(value)?;
            Ok(with_sign(format!("{:X}", n.unsigned_abs()), spec, n < 0))
        }
        Some('o') => {
            let n = as_i64(value)?;
            Ok(with_sign(format!("{:o}", n.unsigned_abs()), spec, n < 0))
        }
        Some('b') => {
            let n = as_i64(value)?;
            Ok(with_sign(format!("{:b}", n.unsigned_abs()), spec, n < 0))
        }
        Some('%') => {
            let f = as_f64(value)?;
            let prec = spec.precision.unwrap_or(6);
            Ok(format!("{:.*}%", prec, f * 100.0))
        }
        Some(other) => Err(TemplateError::Malformed(format!(
            "unsupported format type '{other}'"
        ))),
    }
}

fn is_numeric_type(ty: Option<char>) -> bool {
    matches!(ty, Some('d' | 'f' | 'F' | 'x' | 'X' | 'o' | 'b' | '%'))
}

fn with_sign(magnitude: String, spec: &Spec, negative: bool) -> String {
    let sign = if negative {
        "-"
    } else {
        match spec.sign {
            Some('+') => "+",
            Some(' ') => " ",
            _ => "",
        }
    };
    format!("{sign}{magnitude}")
}

fn as_i64(value: &Value) -> Result<i64, TemplateError> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Float(f) => Ok(*f as i64),
        Value::Text(s) => s
            .parse()
            .map_err(|_| TemplateError::Malformed(format!("'{s}' is not an integer"))),
        other => Err(TemplateError::Malformed(format!(
            "{other} is not numeric"
        ))),
    }
}

fn as_f64(value: &Value) -> Result<f64, TemplateError> {
    match value {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(f) => Ok(*f),
        Value::Text(s) => s
            .parse()
            .map_err(|_| TemplateError::Malformed(format!("'{s}' is not a float"))),
        other => Err(TemplateError::Malformed(format!(
            "{other} is not numeric"
        ))),
    }
}

fn pad(body: &str, spec: &Spec, numeric: bool) -> String {
    let width = match spec.width {
        Some(w) if w > body.chars().count() => w,
        _ => return body.to_string(),
    };
    let deficit = width - body.chars().count();
    let fill = spec.fill;

    if spec.zero_pad && spec.align.is_none() {
        let (sign, rest) = match body.strip_prefix(['-', '+', ' ']) {
            Some(rest) => (&body[..1], rest),
            None => ("", body),
        };
        return format!("{sign}{}{rest}", "0".repeat(deficit));
    }

    let default_align = if numeric { '>' } else { '<' };
    match spec.align.unwrap_or(default_align) {
        '>' => format!("{}{body}", fill.to_string().repeat(deficit)),
        '^' => {
            let left = deficit / 2;
            let right = deficit - left;
            format!(
                "{}{body}{}",
                fill.to_string().repeat(left),
                fill.to_string().repeat(right)
            )
        }
        _ => format!("{body}{}", fill.to_string().repeat(deficit)),
    }
}
