use super::*;
use crate::actions::Action;
use crate::sinks::fakes::RecordingSink;

fn compile(text: &str) -> Template {
    Template::compile(&Value::Text(text.to_string())).unwrap()
}

#[test]
fn statsd_action_prefixes_name_and_scales_value() {
    let sink: Arc<RecordingSink<StatsdMetric>> = Arc::new(RecordingSink::new());
    let action = StatsdAction {
        sink: sink.clone(),
        name: compile("requests"),
        value: compile("{count}"),
        kind: StatsdKind::Counter,
        multiplier: 1.0,
        prefix: Some("logshipper".to_string()),
        phase: Phase::FORWARD,
    };
    let mut message = Message::new();
    message.set("count", Value::Int(3));
    let mut ctx = Context::new(None);

    assert_eq!(action.invoke(&mut message, &mut ctx).unwrap(), Outcome::Continue);
    let calls = sink.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "logshipper.requests");
    assert_eq!(calls[0].value, 3.0);
}

#[test]
fn rabbitmq_action_publishes_message_as_json() {
    let sink: Arc<RecordingSink<serde_json::Value>> = Arc::new(RecordingSink::new());
    let action = RabbitmqAction {
        sink: sink.clone(),
        phase: Phase::FORWARD,
    };
    let mut message = Message::new();
    message.set("message", Value::Text("hi".to_string()));
    let mut ctx = Context::new(None);

    action.invoke(&mut message, &mut ctx).unwrap();
    let calls = sink.calls.lock();
    assert_eq!(calls[0]["message"], serde_json::Value::String("hi".to_string()));
}

#[test]
fn elasticsearch_action_defaults_id_to_document_hash() {
    let sink: Arc<RecordingSink<(String, String, String, serde_json::Value)>> =
        Arc::new(RecordingSink::new());
    let action = ElasticsearchAction {
        sink: sink.clone(),
        index: compile("logshipper-test"),
        doctype: compile("doc"),
        id: None,
        phase: Phase::FORWARD,
    };
    let mut message = Message::new();
    message.set("message", Value::Text("hi".to_string()));
    let mut ctx = Context::new(None);

    action.invoke(&mut message, &mut ctx).unwrap();
    let calls = sink.calls.lock();
    let (index, doctype, id, _document) = &calls[0];
    assert_eq!(index, "logshipper-test");
    assert_eq!(doctype, "doc");
    assert_eq!(id.len(), 64);

    // The hash is deterministic on the serialised document.
    let mut other_message = Message::new();
    other_message.set("message", Value::Text("hi".to_string()));
    let sink2: Arc<RecordingSink<(String, String, String, serde_json::Value)>> =
        Arc::new(RecordingSink::new());
    let action2 = ElasticsearchAction {
        sink: sink2.clone(),
        index: compile("logshipper-test"),
        doctype: compile("doc"),
        id: None,
        phase: Phase::FORWARD,
    };
    action2.invoke(&mut other_message, &mut ctx).unwrap();
    assert_eq!(sink2.calls.lock()[0].2, *id);
}

#[test]
fn logging_action_renders_each_field_independently() {
    let sink: Arc<RecordingSink<serde_json::Value>> = Arc::new(RecordingSink::new());
    let action = LoggingAction {
        sink: sink.clone(),
        fields: vec![
            ("level".to_string(), compile("info")),
            ("msg".to_string(), compile("{message}")),
        ],
        phase: Phase::FORWARD,
    };
    let mut message = Message::new();
    message.set("message", Value::Text("boot".to_string()));
    let mut ctx = Context::new(None);

    action.invoke(&mut message, &mut ctx).unwrap();
    let calls = sink.calls.lock();
    assert_eq!(calls[0]["level"], serde_json::Value::String("info".to_string()));
    assert_eq!(calls[0]["msg"], serde_json::Value::String("boot".to_string()));
}
