use super::*;

#[test]
fn parses_single_mapping_inputs() {
    let doc: PipelineDocument = serde_yaml::from_str(
        r#"
inputs:
  file:
    paths: ["/var/log/*.log"]
steps: []
"#,
    )
    .unwrap();
    assert_eq!(doc.inputs.len(), 1);
    assert_eq!(doc.inputs[0].name, "file");
}

#[test]
fn concatenates_sequence_of_input_mappings_in_order() {
    let doc: PipelineDocument = serde_yaml::from_str(
        r#"
inputs:
  - file:
      paths: ["/a/*.log"]
  - stdin: {}
    command:
      run: "tail -f /b.log"
steps: []
"#,
    )
    .unwrap();
    let names: Vec<&str> = doc.inputs.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["file", "stdin", "command"]);
}

#[test]
fn steps_preserve_action_declaration_order() {
    let doc: PipelineDocument = serde_yaml::from_str(
        r#"
steps:
  - match: "foo"
    set:
      bar: "1"
"#,
    )
    .unwrap();
    let keys: Vec<&str> = doc.steps[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["match", "set"]);
}

#[test]
fn missing_top_level_keys_default_to_empty() {
    let doc: PipelineDocument = serde_yaml::from_str("{}").unwrap();
    assert!(doc.inputs.is_empty());
    assert!(doc.steps.is_empty());
}
