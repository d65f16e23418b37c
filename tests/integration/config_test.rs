use poolwatch::core::config::Config;
use poolwatch::core::severity::Severity;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.www.log_buffer, 1000);
    assert!(config.www.root.is_empty());
}

#[test]
fn test_config_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        [www]
        root = "/pools/"
        log_buffer = 3

        [www.severity_class]
        err = "danger"
        "#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.www.root, "/pools");
    assert_eq!(config.www.log_buffer, 3);
    assert_eq!(config.classifier().log_severity.classify(Severity::Err), "danger");
}

#[test]
fn test_config_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(Config::load(Some(&temp_dir.path().join("missing.toml"))).is_err());
}

#[test]
fn test_config_bad_severity_key_names_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[www.used_space_class]\nscary = \"x\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(format!("{:#}", err).contains("config.toml"));
}
