//! Integration tests for `ossdk check`

mod common;

use common::{stderr, stdout, TestProject, LOCAL_CATALOG, LOCAL_CONFIG};
use predicates::prelude::*;

#[test]
fn test_check_builtin_catalog() {
    let project = TestProject::new();
    project.create_dir("ref-sdk/usr/lib");
    project.create_dir("cf-patches");
    project.create_file("ossdk.toml", "reference_sdk = \"ref-sdk\"\n");

    let output = project.run(&["check"]);

    assert!(output.status.success(), "check failed: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("39 packages"), "{out}");
    assert!(out.contains("0 built, 39 to build"), "{out}");
}

#[test]
fn test_check_warns_about_missing_reference_sdk() {
    let project = TestProject::new();
    project.create_file("ossdk.toml", "reference_sdk = \"nowhere\"\n");

    let output = project.run(&["check"]);

    assert!(output.status.success());
    assert!(predicate::str::contains("Reference SDK").eval(&stdout(&output)));
}

#[test]
fn test_check_custom_catalog() {
    let project = TestProject::new();
    project.create_file("ossdk.toml", LOCAL_CONFIG);
    project.create_file("catalog.toml", LOCAL_CATALOG);

    let output = project.run(&["check"]);

    assert!(output.status.success(), "check failed: {}", stderr(&output));
    assert!(stdout(&output).contains("2 packages"));
}

#[test]
fn test_check_rejects_out_of_order_dependency() {
    let project = TestProject::new();
    project.create_file("ossdk.toml", "catalog = \"catalog.toml\"\n");
    project.create_file(
        "catalog.toml",
        r#"
[[package]]
name = "xnu"
dependencies = ["CoreOSMakefiles"]

[[package]]
name = "CoreOSMakefiles"
"#,
    );

    let output = project.run(&["check"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("declared after"), "{err}");
    assert!(err.contains("catalog.toml"), "{err}");
}

#[test]
fn test_check_rejects_unknown_hook() {
    let project = TestProject::new();
    project.create_file("ossdk.toml", "catalog = \"catalog.toml\"\n");
    project.create_file("catalog.toml", "[[package]]\nname = \"zlib\"\nhook = \"zlib\"\n");

    let output = project.run(&["check"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown build hook 'zlib'"));
}

#[test]
fn test_check_invalid_config() {
    let project = TestProject::new();
    project.create_file("ossdk.toml", "sdk_version = [not toml\n");

    let output = project.run(&["check"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load configuration"));
}

#[test]
fn test_check_explicit_missing_config() {
    let project = TestProject::new();

    let output = project.run(&["--config", "absent.toml", "check"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("absent.toml"));
}
