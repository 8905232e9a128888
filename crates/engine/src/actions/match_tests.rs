use super::*;
use crate::actions::Action;
use logshipper_core::Value;

fn pattern(field: &str, re: &str) -> FieldPattern {
    FieldPattern {
        field: field.to_string(),
        regex: Regex::new(re).unwrap(),
    }
}

#[test]
fn s1_single_field_match_populates_backreferences() {
    let mut message = Message::new();
    message.set("message", Value::Text("The Time: 1234".into()));
    let mut ctx = Context::new(None);

    let action = MatchAction {
        fields: vec![pattern("message", r"(Time):\s+(?P<time>\d+)")],
        phase: Phase::MATCH,
    };
    let outcome = action.invoke(&mut message, &mut ctx).unwrap();

    assert_eq!(outcome, Outcome::Continue);
    assert_eq!(message.get_text("time"), Some("1234"));
    assert_eq!(ctx.backreferences, vec!["Time: 1234", "Time", "1234"]);
    assert_eq!(ctx.match_field.as_deref(), Some("message"));
}

#[test]
fn s2_multi_field_match_has_no_single_field_context() {
    let mut message = Message::new();
    message.set("message", Value::Text("This is a test.".into()));
    message.set("foo", Value::Text("barbar".into()));
    let mut ctx = Context::new(None);

    let action = MatchAction {
        fields: vec![pattern("message", r"(t.st)"), pattern("foo", r"(?P<boo>b.r)")],
        phase: Phase::MATCH,
    };
    let outcome = action.invoke(&mut message, &mut ctx).unwrap();

    assert_eq!(outcome, Outcome::Continue);
    assert!(ctx.match_field.is_none());
    assert!(ctx.backreferences.is_empty());
    assert_eq!(message.get_text("boo"), Some("bar"));
}

#[test]
fn s3_extract_elides_matched_span_from_each_field() {
    let mut message = Message::new();
    message.set("message", Value::Text("This is a test.".into()));
    message.set("foo", Value::Text("barbar".into()));
    let mut ctx = Context::new(None);

    let action = ExtractAction {
        fields: vec![pattern("message", r"(t.st)"), pattern("foo", r"(?P<boo>b.r)")],
        phase: Phase::MATCH,
    };
    let outcome = action.invoke(&mut message, &mut ctx).unwrap();

    assert_eq!(outcome, Outcome::Continue);
    assert_eq!(message.get_text("message"), Some("This is a ."));
    assert_eq!(message.get_text("foo"), Some("bar"));
    assert_eq!(message.get_text("boo"), Some("bar"));
}

#[test]
fn non_match_on_any_field_skips_step() {
    let mut message = Message::new();
    message.set("message", Value::Text("no digits here".into()));
    let mut ctx = Context::new(None);

    let action = MatchAction {
        fields: vec![pattern("message", r"\d+")],
        phase: Phase::MATCH,
    };
    let outcome = action.invoke(&mut message, &mut ctx).unwrap();
    assert_eq!(outcome, Outcome::SkipStep);
}
