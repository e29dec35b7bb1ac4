//! Tests for YAML settings.

use std::fs;

use omni_lint::{Category, LintError, LintSettings, RuleConfig, Severity};

#[test]
fn test_defaults_when_section_missing() {
    let settings = LintSettings::from_yaml_str("other: 1\n").unwrap();
    assert_eq!(settings.rule_config(), Some(RuleConfig::default()));
    assert_eq!(LintSettings::from_yaml_str("").unwrap(), LintSettings::default());
}

#[test]
fn test_categories_and_severity() {
    let settings = LintSettings::from_yaml_str(
        "type_names:\n  categories: [parameter]\n  severity: warning\n",
    )
    .unwrap();
    let config = settings.rule_config().unwrap();
    assert_eq!(config.categories, vec![Category::Parameter]);
    assert_eq!(config.severity, Severity::Warning);
}

#[test]
fn test_disabled_rule() {
    let settings = LintSettings::from_yaml_str("type_names:\n  enabled: false\n").unwrap();
    assert!(settings.rule_config().is_none());
}

#[test]
fn test_invalid_values_are_errors() {
    let err = LintSettings::from_yaml_str("type_names:\n  severity: fatal\n").unwrap_err();
    assert!(matches!(err, LintError::Settings(_)));
}

#[test]
fn test_user_file_overrides_system_file() {
    let dir = tempfile::tempdir().unwrap();
    let system = dir.path().join("system.yaml");
    let user = dir.path().join("user.yaml");
    fs::write(&system, "type_names:\n  severity: info\n  categories: [method]\n").unwrap();
    fs::write(&user, "type_names:\n  severity: error\n").unwrap();

    let config = LintSettings::load_merged(&system, &user).rule_config().unwrap();
    assert_eq!(config.severity, Severity::Error);
    assert_eq!(config.categories, vec![Category::Method]);
}

#[test]
fn test_broken_or_missing_files_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.yaml");
    fs::write(&broken, "type_names: [").unwrap();
    let missing = dir.path().join("missing.yaml");

    let settings = LintSettings::load_merged(&broken, &missing);
    assert_eq!(settings, LintSettings::default());
    assert!(matches!(LintSettings::load(&missing), Err(LintError::Io { .. })));
}
