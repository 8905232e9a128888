use super::*;

#[test]
fn config_patterns_covers_both_yaml_extensions() {
    let patterns = config_patterns(std::path::Path::new("/etc/logshipper"));
    assert_eq!(
        patterns,
        vec!["/etc/logshipper/*.yaml".to_string(), "/etc/logshipper/*.yml".to_string()]
    );
}

#[tokio::test]
async fn validate_reports_well_formed_documents_as_valid() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("web.yaml"), "steps:\n  - match: \"foo\"\n").unwrap();

    let result = validate(ValidateArgs { config_dir: dir.path().to_path_buf() });
    assert!(result.is_ok());
}

#[tokio::test]
async fn validate_fails_and_reports_a_broken_document() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.yaml"), "steps: [").unwrap();

    let result = validate(ValidateArgs { config_dir: dir.path().to_path_buf() });
    assert!(result.is_err());
}
