use super::*;

#[test]
fn stamp_mandatory_fills_only_missing_fields() {
    let mut m = Message::new();
    m.set(FIELD_MESSAGE, Value::Text("hello".into()));
    m.stamp_mandatory("myhost");

    assert_eq!(m.get_text(FIELD_MESSAGE), Some("hello"));
    assert_eq!(m.get_text(FIELD_HOSTNAME), Some("myhost"));
    assert!(m.get(FIELD_TIMESTAMP).unwrap().as_timestamp().is_some());
}

#[test]
fn stamp_mandatory_does_not_override_existing_timestamp() {
    let mut m = Message::new();
    let fixed = chrono::DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    m.set(FIELD_TIMESTAMP, Value::Timestamp(fixed));
    m.stamp_mandatory("myhost");

    assert_eq!(m.get(FIELD_TIMESTAMP).unwrap().as_timestamp(), Some(fixed));
}

#[test]
fn unset_preserves_remaining_order() {
    let mut m = Message::new();
    m.set("a", Value::Int(1));
    m.set("b", Value::Int(2));
    m.set("c", Value::Int(3));
    m.unset("b");

    let keys: Vec<&String> = m.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "c"]);
}
