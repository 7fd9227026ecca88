//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// A temporary working directory the binary runs in. The user config
/// directory is redirected into it so the host configuration never leaks
/// into a test.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run ossdk with `args` inside the project
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_ossdk"))
            .current_dir(self.dir.path())
            .args(args)
            .env("OSSDK_CONFIG_DIR", self.dir.path().join(".user-config"))
            .env_remove("OSSDK_CONFIG")
            .env_remove("OSSDK_BUILD_DIR")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute ossdk")
    }

    /// Commit `name` as a git repository with its current contents
    pub fn init_git_repo(&self, name: &str) {
        let dir = self.dir.path().join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create repository directory");
        git(&dir, &["init", "-q"]);
        git(&dir, &["add", "-A"]);
        git(&dir, &["commit", "-q", "--allow-empty", "-m", "import"]);
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {args:?} failed");
}

/// Whether git is on PATH
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Stdout as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Two-package catalog whose sources are plain directories in the monorepo
pub const LOCAL_CATALOG: &str = r#"
[[package]]
name = "libclosure"

[[package.output]]
sdk_dir = "usr/include"
files = ["Block.h"]

[[package]]
name = "libdispatch"
dependencies = ["libclosure"]

[[package.output]]
sdk_dir = "usr/include/dispatch"
globs = ["dispatch/**/*.h"]

[[package.symlink]]
dir = "usr/include/os"
link = "object.h"
target = "../dispatch/object.h"
"#;

/// Config pointing at [`LOCAL_CATALOG`] and a local reference SDK
pub const LOCAL_CONFIG: &str = r#"
reference_sdk = "ref-sdk"
catalog = "catalog.toml"
"#;
