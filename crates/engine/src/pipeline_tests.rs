use super::*;
use crate::builtins::{register_builtins, BuiltinsContext};
use crate::sinks::fakes::RecordingSink;
use logshipper_config::PipelineDocument;
use logshipper_core::{DispatchError, Message, Value};
use std::sync::Mutex;

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

fn document(yaml: &str) -> PipelineDocument {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn unmatched_match_skips_the_rest_of_the_step() {
    let registry = test_registry();
    let doc = document(
        "steps:\n\
         - match: \"needle (\\\\d+)\"\n\
           set:\n\
             found: \"{1}\"\n\
         - set:\n\
             stage: two\n",
    );
    let pipeline = CompiledPipeline::compile("main", &doc, &registry).unwrap();

    let out = pipeline
        .run(Message::with_text("message", "no match here"), None)
        .unwrap();
    assert!(!out.contains("found"));
    assert_eq!(out.get("stage").and_then(Value::as_text), Some("two"));
}

#[test]
fn matched_step_runs_manipulate_actions_in_phase_order() {
    let registry = test_registry();
    let doc = document(
        "steps:\n\
         - match: \"needle (\\\\d+)\"\n\
           set:\n\
             found: \"{1}\"\n",
    );
    let pipeline = CompiledPipeline::compile("main", &doc, &registry).unwrap();

    let out = pipeline
        .run(Message::with_text("message", "needle 99"), None)
        .unwrap();
    assert_eq!(out.get("found").and_then(Value::as_text), Some("99"));
}

#[test]
fn drop_action_drops_the_message() {
    let registry = test_registry();
    let doc = document("steps:\n- drop: {}\n");
    let pipeline = CompiledPipeline::compile("main", &doc, &registry).unwrap();

    assert!(pipeline.run(Message::with_text("message", "x"), None).is_none());
}

#[test]
fn template_underflow_is_contained_and_message_proceeds() {
    let registry = test_registry();
    let doc = document(
        "steps:\n\
         - set:\n\
             group: \"{1}\"\n\
         - set:\n\
             stage: two\n",
    );
    let pipeline = CompiledPipeline::compile("main", &doc, &registry).unwrap();

    let out = pipeline
        .run(Message::with_text("message", "no backreferences yet"), None)
        .unwrap();
    assert!(!out.contains("group"));
    assert_eq!(out.get("stage").and_then(Value::as_text), Some("two"));
}

struct StubDispatcher {
    calls: Mutex<Vec<String>>,
}

impl logshipper_core::Dispatcher for StubDispatcher {
    fn process(&self, message: Message, pipeline: &str) -> Result<Message, DispatchError> {
        self.calls.lock().unwrap().push(pipeline.to_string());
        Ok(message)
    }

    fn process_async(&self, _message: Message, pipeline: &str) {
        self.calls.lock().unwrap().push(pipeline.to_string());
    }
}

#[test]
fn jump_action_drops_the_local_message_after_dispatch() {
    let registry = test_registry();
    let doc = document("steps:\n- jump: elsewhere\n");
    let pipeline = CompiledPipeline::compile("main", &doc, &registry).unwrap();
    let dispatcher: Arc<dyn logshipper_core::Dispatcher> = Arc::new(StubDispatcher {
        calls: Mutex::new(Vec::new()),
    });

    let out = pipeline.run(Message::with_text("message", "x"), Some(dispatcher));
    assert!(out.is_none());
}

#[test]
fn steps_compile_in_declared_order() {
    let registry = test_registry();
    let doc = document(
        "steps:\n\
         - set:\n\
             a: \"1\"\n\
         - set:\n\
             b: \"2\"\n",
    );
    let pipeline = CompiledPipeline::compile("ordered", &doc, &registry).unwrap();
    assert_eq!(pipeline.name(), "ordered");
    assert_eq!(pipeline.steps.len(), 2);

    let out = pipeline.run(Message::new(), None).unwrap();
    assert_eq!(out.get("a").and_then(Value::as_text), Some("1"));
    assert_eq!(out.get("b").and_then(Value::as_text), Some("2"));
}
