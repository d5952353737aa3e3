//! Integration tests for rule files: loading, validation and application

use chart_values_patcher::config::{
    apply_rules, apply_to_file, load_from_path, load_from_str, ApplicationError, ConfigError,
    FileOutcome, ValidationIssue,
};
use chart_values_patcher::UpdateError;
use std::fs;
use tempfile::TempDir;

/// Helper to create a temp dir with a values file
fn setup_chart() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("values.yaml"),
        r#"# web chart
image:
  repository: nginx # upstream
  tag: "1.25"
worker:
  image:
    repository: busybox
    tag: latest
"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_load_rule_set_basic() {
    let rules = load_from_str(
        r#"
[meta]
name = "mirror"
description = "Use the internal mirror"

[[rules]]
id = "image"
path = ".image"
values = { repository = "mirror.local/nginx" }
"#,
    )
    .unwrap();

    assert_eq!(rules.meta.name, "mirror");
    assert_eq!(
        rules.meta.description.as_deref(),
        Some("Use the internal mirror")
    );
    assert_eq!(rules.rules.len(), 1);
    assert!(rules.rules[0].rule.selectors.is_empty());
}

#[test]
fn test_values_must_be_strings() {
    let err = load_from_str(
        r#"
[[rules]]
id = "image"
path = ".image"
values = { tag = 1 }
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn test_validation_reports_each_rule() {
    let err = load_from_str(
        r#"
[[rules]]
id = "a"
values = { tag = "x" }

[[rules]]
id = "a"
path = ".b"
values = { tag = "x" }
"#,
    )
    .unwrap_err();

    match err {
        ConfigError::Validation { source, .. } => {
            assert_eq!(source.issues.len(), 2);
            assert!(matches!(
                source.issues[0],
                ValidationIssue::InvalidCombo { .. }
            ));
            assert_eq!(
                source.issues[1],
                ValidationIssue::DuplicateId {
                    rule_id: "a".to_string()
                }
            );
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn test_apply_rules_to_chart() {
    let dir = setup_chart();
    let values = dir.path().join("values.yaml");
    let rules = load_from_str(
        r#"
[[rules]]
id = "images"
selectors = { tag = "latest" }
values = { repository = "mirror.local/busybox", tag = "1.36" }

[[rules]]
id = "main"
path = ".image"
values = { repository = "mirror.local/nginx" }
"#,
    )
    .unwrap();

    let outcome = apply_to_file(&rules, &values, false).unwrap();
    assert!(outcome.is_changed());
    assert_eq!(outcome.file(), values.as_path());
    assert_eq!(
        fs::read_to_string(&values).unwrap(),
        r#"# web chart
image:
  repository: mirror.local/nginx # upstream
  tag: "1.25"
worker:
  image:
    repository: mirror.local/busybox
    tag: '1.36'
"#
    );
}

#[test]
fn test_failed_rule_leaves_file_untouched() {
    let dir = setup_chart();
    let values = dir.path().join("values.yaml");
    let before = fs::read_to_string(&values).unwrap();
    let rules = load_from_str(
        r#"
[[rules]]
id = "main"
path = ".image"
values = { repository = "mirror.local/nginx" }

[[rules]]
id = "digest"
path = ".image"
values = { digest = "sha256:abc" }
"#,
    )
    .unwrap();

    let err = apply_to_file(&rules, &values, false).unwrap_err();
    match &err {
        ApplicationError::Rule { id, source } => {
            assert_eq!(id, "digest");
            assert!(matches!(source, UpdateError::MissingField { field, .. } if field == "digest"));
            assert!(!source.is_internal());
        }
        other => panic!("expected rule error, got {other}"),
    }
    assert_eq!(fs::read_to_string(&values).unwrap(), before);
}

#[test]
fn test_dry_run_reports_without_writing() {
    let dir = setup_chart();
    let values = dir.path().join("values.yaml");
    let before = fs::read(&values).unwrap();
    let rules = load_from_str(
        r#"
[[rules]]
id = "main"
path = ".image"
values = { tag = "1.26" }
"#,
    )
    .unwrap();

    match apply_to_file(&rules, &values, true).unwrap() {
        FileOutcome::Changed {
            before: seen,
            after,
            ..
        } => {
            assert_eq!(seen, before);
            assert_eq!(apply_rules(&rules, &before).unwrap(), after);
        }
        other => panic!("expected a change, got {other}"),
    }
    assert_eq!(fs::read(&values).unwrap(), before);
}

#[test]
fn test_load_from_path_reports_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[[rules]\n").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("broken.toml"));
}
