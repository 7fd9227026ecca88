//! Integration tests for `ossdk doctor`

mod common;

use common::{stderr, stdout, TestProject};

#[test]
fn test_doctor_lists_host_tools() {
    let project = TestProject::new();
    project.create_dir("ref-sdk/usr/lib");
    project.create_file("ossdk.toml", "reference_sdk = \"ref-sdk\"\n");

    let output = project.run(&["doctor"]);

    // Host tools vary between machines; only the report shape is stable
    let out = stdout(&output);
    for tool in ["git", "make", "xcodebuild", "cmake", "patch", "bash"] {
        assert!(out.contains(tool), "missing {tool} in: {out}");
    }
    let perl = out.lines().find(|l| l.contains("perl")).unwrap_or_default();
    assert!(perl.ends_with("[optional]"), "{perl}");
    assert!(out.contains("✓ Reference SDK"), "{out}");
}

#[test]
fn test_doctor_fails_without_reference_sdk() {
    let project = TestProject::new();
    project.create_file("ossdk.toml", "reference_sdk = \"missing-sdk\"\n");

    let output = project.run(&["doctor"]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("✗ Reference SDK"));
    assert!(stderr(&output).contains("Missing required dependencies"));
}

#[test]
fn test_doctor_quiet_reports_only_failures() {
    let project = TestProject::new();
    project.create_file("ossdk.toml", "reference_sdk = \"missing-sdk\"\n");

    let output = project.run(&["-q", "doctor"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("Missing required: Reference SDK"));
}
