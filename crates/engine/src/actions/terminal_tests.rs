use super::*;
use crate::actions::Action;

fn compile(text: &str) -> Template {
    Template::compile(&Value::Text(text.to_string())).unwrap()
}

#[test]
fn stdout_action_renders_templated_format() {
    let writer = std::sync::Arc::new(BufferWriter::new());
    let action = StdoutAction {
        format: compile("[{hostname}] {message}"),
        writer: writer.clone(),
        phase: Phase::FORWARD,
    };
    let mut message = Message::new();
    message.set("hostname", Value::Text("web-1".into()));
    message.set("message", Value::Text("boot complete".into()));
    let mut ctx = Context::new(None);

    assert_eq!(action.invoke(&mut message, &mut ctx).unwrap(), Outcome::Continue);
    assert_eq!(writer.lines.lock().as_slice(), ["[web-1] boot complete"]);
}

#[test]
fn debug_action_writes_every_field_as_repr() {
    let writer = std::sync::Arc::new(BufferWriter::new());
    let action = DebugAction {
        writer: writer.clone(),
        phase: Phase::FORWARD,
    };
    let mut message = Message::new();
    message.set("message", Value::Text("hi".into()));
    message.set("count", Value::Int(2));
    let mut ctx = Context::new(None);

    action.invoke(&mut message, &mut ctx).unwrap();
    assert_eq!(writer.lines.lock().as_slice(), ["message=\"hi\", count=2"]);
}
