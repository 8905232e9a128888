use super::*;

#[test]
fn display_string_renders_whole_floats_with_one_decimal() {
    assert_eq!(Value::Float(3.0).display_string(), "3.0");
    assert_eq!(Value::Float(3.5).display_string(), "3.5");
}

#[test]
fn repr_string_quotes_text_only() {
    assert_eq!(Value::Text("hi".into()).repr_string(), "\"hi\"");
    assert_eq!(Value::Int(7).repr_string(), "7");
}

#[test]
fn ascii_repr_escapes_non_ascii() {
    let v = Value::Text("café".into());
    let repr = v.ascii_repr_string();
    assert!(repr.is_ascii());
    assert!(repr.contains("\\u{e9}"));
}

#[test]
fn is_truthy_matches_text_truth_values() {
    assert!(Value::Text("yes".into()).is_truthy());
    assert!(Value::Text("ON".into()).is_truthy());
    assert!(!Value::Text("no".into()).is_truthy());
    assert!(!Value::Text("".into()).is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(Value::Int(1).is_truthy());
    assert!(!Value::Int(0).is_truthy());
}

#[test]
fn index_looks_up_map_and_seq() {
    let mut map = IndexMap::new();
    map.insert("a".to_string(), Value::Int(1));
    let v = Value::Map(map);
    assert_eq!(v.index("a"), Some(&Value::Int(1)));
    assert_eq!(v.index("missing"), None);

    let seq = Value::Seq(vec![Value::Text("x".into()), Value::Text("y".into())]);
    assert_eq!(seq.index("1"), Some(&Value::Text("y".into())));
    assert_eq!(seq.index("not-a-number"), None);
}

#[test]
fn from_yaml_preserves_mapping_order() {
    let yaml: serde_yaml::Value = serde_yaml::from_str("z: 1\na: 2\nm: 3\n").unwrap();
    let v = Value::from(yaml);
    let keys: Vec<&str> = v.as_map().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn from_yaml_numbers_prefer_integer() {
    let yaml: serde_yaml::Value = serde_yaml::from_str("7").unwrap();
    assert_eq!(Value::from(yaml), Value::Int(7));

    let yaml: serde_yaml::Value = serde_yaml::from_str("7.5").unwrap();
    assert_eq!(Value::from(yaml), Value::Float(7.5));
}
