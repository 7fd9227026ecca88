//! Integration tests for `ossdk clean`

mod common;

use common::{stderr, stdout, TestProject};

fn create_build_state(project: &TestProject) {
    project.create_file("sdk-build/built-packages.json", r#"["dyld"]"#);
    project.create_file("sdk-build/oss-sdk14.4/usr/include/dlfcn.h", "// dlfcn\n");
    project.create_file("sdk-build/distribution-macOS/dyld/include/dlfcn.h", "// src\n");
}

#[test]
fn test_clean_removes_checkpoint_and_sdk() {
    let project = TestProject::new();
    create_build_state(&project);

    let output = project.run(&["clean"]);

    assert!(output.status.success(), "clean failed: {}", stderr(&output));
    assert!(!project.file_exists("sdk-build/built-packages.json"));
    assert!(!project.file_exists("sdk-build/oss-sdk14.4"));
    assert!(project.file_exists("sdk-build/distribution-macOS/dyld/include/dlfcn.h"));
    assert!(stdout(&output).contains("Removed"));
}

#[test]
fn test_clean_checkpoint_only_keeps_sdk() {
    let project = TestProject::new();
    create_build_state(&project);

    let output = project.run(&["clean", "--checkpoint-only"]);

    assert!(output.status.success());
    assert!(!project.file_exists("sdk-build/built-packages.json"));
    assert!(project.file_exists("sdk-build/oss-sdk14.4/usr/include/dlfcn.h"));
}

#[test]
fn test_clean_nothing_to_clean() {
    let project = TestProject::new();

    let output = project.run(&["clean"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Nothing to clean"));
}

#[test]
fn test_clean_respects_sdk_version() {
    let project = TestProject::new();
    project.create_file("ossdk.toml", "sdk_version = \"14.5\"\n");
    create_build_state(&project);
    project.create_dir("sdk-build/oss-sdk14.5");

    let output = project.run(&["clean"]);

    assert!(output.status.success());
    assert!(!project.file_exists("sdk-build/oss-sdk14.5"));
    assert!(project.file_exists("sdk-build/oss-sdk14.4"));
}
