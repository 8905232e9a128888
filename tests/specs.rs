//! End-to-end scenarios exercising a compiled pipeline the way
//! `logshipper-daemon` drives one, without going through the manager's
//! filesystem discovery or concrete sinks.

use logshipper_config::PipelineDocument;
use logshipper_engine::builtins::{register_builtins, BuiltinsContext};
use logshipper_engine::sinks::fakes::RecordingSink;
use logshipper_engine::{CompiledPipeline, Registry};
use logshipper_core::{Message, Value};

fn registry() -> Registry {
    let mut registry = Registry::new();
    register_builtins(
        &mut registry,
        BuiltinsContext {
            statsd: std::sync::Arc::new(RecordingSink::new()),
            rabbitmq: std::sync::Arc::new(RecordingSink::new()),
            elasticsearch: std::sync::Arc::new(RecordingSink::new()),
            logging: std::sync::Arc::new(RecordingSink::new()),
        },
    );
    registry
}

fn compile(name: &str, yaml: &str) -> CompiledPipeline {
    let doc: PipelineDocument = serde_yaml::from_str(yaml).unwrap();
    CompiledPipeline::compile(name, &doc, &registry()).unwrap()
}

/// S1. Single-field match + set: named and positional backreferences both
/// resolve into the templated field.
#[test]
fn single_field_match_interpolates_named_and_positional_backreferences() {
    let pipeline = compile(
        "s1",
        "steps:\n\
         - match: \"(Time):\\\\s+(?P<time>\\\\d+)\"\n\
           set:\n\
             part: \"{1} {time}\"\n",
    );

    let out = pipeline.run(Message::with_text("message", "The Time: 1234"), None).unwrap();
    assert_eq!(out.get_text("message"), Some("The Time: 1234"));
    assert_eq!(out.get_text("time"), Some("1234"));
    assert_eq!(out.get_text("part"), Some("Time 1234"));
}

/// S2. Multi-field match: every field's own capture group lands on the
/// message, independent of the other field's pattern.
#[test]
fn multi_field_match_captures_each_fields_own_groups() {
    let pipeline = compile("s2", "steps:\n- match:\n    message: \"(t.st)\"\n    foo: \"(?P<boo>b.r)\"\n");

    let mut input = Message::with_text("message", "This is a test.");
    input.set("foo", Value::Text("barbar".to_string()));

    let out = pipeline.run(input, None).unwrap();
    assert_eq!(out.get_text("boo"), Some("bar"));
}

/// S3. Extract rewrites the field to the unmatched remainder and still
/// exposes the capture group.
#[test]
fn extract_rewrites_fields_to_the_unmatched_remainder() {
    let pipeline = compile("s3", "steps:\n- extract:\n    message: \"(t.st)\"\n    foo: \"(?P<boo>b.r)\"\n");

    let mut input = Message::with_text("message", "This is a test.");
    input.set("foo", Value::Text("barbar".to_string()));

    let out = pipeline.run(input, None).unwrap();
    assert_eq!(out.get_text("message"), Some("This is a ."));
    assert_eq!(out.get_text("foo"), Some("bar"));
    assert_eq!(out.get_text("boo"), Some("bar"));
}

/// S4. Edge with backlog 2: repeats are skipped, a third distinct key
/// evicts the least-recently-touched entry so it can reappear as novel.
#[test]
fn edge_with_backlog_two_tracks_least_recently_touched_eviction() {
    let pipeline = compile(
        "s4",
        "steps:\n\
         - edge:\n\
             trigger: \"{message}\"\n\
             backlog: 2\n\
           set:\n\
             seen: \"yes\"\n",
    );

    let feed = ["1", "2", "1", "2", "3", "1"];
    let continued: Vec<bool> = feed
        .iter()
        .map(|v| {
            let out = pipeline.run(Message::with_text("message", *v), None).unwrap();
            out.contains("seen")
        })
        .collect();

    assert_eq!(continued, vec![true, true, false, false, true, true]);
}

/// S5. A message timestamped in the future falls outside a 1-minute
/// window and is skip-stepped; one timestamped now is not.
#[test]
fn timewindow_skips_messages_outside_the_window() {
    let pipeline = compile(
        "s5",
        "steps:\n\
         - timewindow: \"1m\"\n\
           set:\n\
             in_window: \"yes\"\n",
    );

    let mut future = Message::with_text("message", "late");
    future.set("timestamp", Value::Timestamp(chrono::Utc::now() + chrono::Duration::minutes(2)));
    let out = pipeline.run(future, None).unwrap();
    assert!(!out.contains("in_window"));

    let mut now = Message::with_text("message", "on time");
    now.set("timestamp", Value::Timestamp(chrono::Utc::now()));
    let out = pipeline.run(now, None).unwrap();
    assert_eq!(out.get_text("in_window"), Some("yes"));
}
