use super::*;
use crate::sinks::fakes::RecordingSink;
use logshipper_core::{Context, Message};
use serde_yaml::Value as Yaml;

fn test_registry() -> Registry {
    let mut registry = Registry::new();
    register_builtins(
        &mut registry,
        BuiltinsContext {
            statsd: Arc::new(RecordingSink::new()),
            rabbitmq: Arc::new(RecordingSink::new()),
            elasticsearch: Arc::new(RecordingSink::new()),
            logging: Arc::new(RecordingSink::new()),
        },
    );
    registry
}

fn yaml(text: &str) -> Yaml {
    serde_yaml::from_str(text).unwrap()
}

#[test]
fn match_accepts_bare_string_as_message_pattern() {
    let registry = test_registry();
    let action = registry.build("match", &Yaml::String("(\\d+)".to_string())).unwrap();
    let mut message = Message::with_text("message", "order 42");
    let mut ctx = Context::new(None);
    assert_eq!(action.invoke(&mut message, &mut ctx).unwrap(), crate::Outcome::Continue);
    assert_eq!(ctx.backreferences, vec!["42", "42"]);
}

#[test]
fn unset_accepts_comma_separated_string() {
    let registry = test_registry();
    let action = registry.build("unset", &Yaml::String("a, b".to_string())).unwrap();
    let mut message = Message::new();
    message.set("a", Value::Text("x".into()));
    message.set("b", Value::Text("y".into()));
    message.set("c", Value::Text("z".into()));
    let mut ctx = Context::new(None);
    action.invoke(&mut message, &mut ctx).unwrap();
    assert!(!message.contains("a"));
    assert!(!message.contains("b"));
    assert!(message.contains("c"));
}

#[test]
fn edge_reads_trigger_and_backlog_from_mapping() {
    let registry = test_registry();
    let params = yaml("trigger: \"{message}\"\nbacklog: 2\n");
    let action = registry.build("edge", &params).unwrap();
    let mut ctx = Context::new(None);

    let mut first = Message::with_text("message", "a");
    assert_eq!(action.invoke(&mut first, &mut ctx).unwrap(), crate::Outcome::Continue);
    let mut second = Message::with_text("message", "a");
    assert_eq!(action.invoke(&mut second, &mut ctx).unwrap(), crate::Outcome::SkipStep);
}

#[test]
fn stdout_bare_string_is_the_format_template() {
    let registry = test_registry();
    let action = registry.build("stdout", &Yaml::String("{message}".to_string())).unwrap();
    let mut message = Message::with_text("message", "hi");
    let mut ctx = Context::new(None);
    assert_eq!(action.invoke(&mut message, &mut ctx).unwrap(), crate::Outcome::Continue);
}

#[test]
fn stdout_defaults_to_message_field_when_no_params() {
    let registry = test_registry();
    let action = registry.build("stdout", &Yaml::Null).unwrap();
    let mut message = Message::with_text("message", "hi");
    let mut ctx = Context::new(None);
    assert_eq!(action.invoke(&mut message, &mut ctx).unwrap(), crate::Outcome::Continue);
}

#[test]
fn jump_accepts_bare_pipeline_name() {
    let registry = test_registry();
    assert!(registry.build("jump", &Yaml::String("other".to_string())).is_ok());
}

#[test]
fn jump_accepts_mapping_form() {
    let registry = test_registry();
    let params = yaml("pipeline: other\n");
    assert!(registry.build("jump", &params).is_ok());
}

#[test]
fn timewindow_parses_combined_delta() {
    let err = parse_delta("timewindow", "bogus").unwrap_err();
    assert!(matches!(err, EngineError::InvalidParams { .. }));
    let delta = parse_delta("timewindow", "1m30s").unwrap();
    assert_eq!(delta, chrono::Duration::seconds(90));
}

#[test]
fn statsd_requires_name() {
    let registry = test_registry();
    let params = yaml("value: \"1\"\n");
    assert!(registry.build("statsd", &params).is_err());
}

#[test]
fn statsd_builds_with_defaults() {
    let registry = test_registry();
    let params = yaml("name: requests\n");
    let action = registry.build("statsd", &params).unwrap();
    let mut message = Message::new();
    let mut ctx = Context::new(None);
    assert_eq!(action.invoke(&mut message, &mut ctx).unwrap(), crate::Outcome::Continue);
}

#[test]
fn elasticsearch_http_defaults_index_and_doctype() {
    let registry = test_registry();
    let action = registry.build("elasticsearch_http", &Yaml::Null).unwrap();
    let mut message = Message::new();
    message.set("message", Value::Text("hi".into()));
    message.set(logshipper_core::message::FIELD_TIMESTAMP, Value::Timestamp(chrono::Utc::now()));
    let mut ctx = Context::new(None);
    assert_eq!(action.invoke(&mut message, &mut ctx).unwrap(), crate::Outcome::Continue);
}
