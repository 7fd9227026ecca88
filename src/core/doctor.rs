//! Doctor command logic
//!
//! Checks the host tools the build hooks invoke and the reference SDK the
//! finalizer and several hooks read from.

use std::path::{Path, PathBuf};

use crate::config::defaults;

/// Result of a single dependency check
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the dependency being checked
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Where it was found
    pub location: Option<PathBuf>,
    /// Error message if check failed
    pub error: Option<String>,
    /// Suggestion for fixing the issue
    pub suggestion: Option<String>,
    /// Whether this is a required or optional dependency
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result
    pub fn pass(name: &str, location: Option<PathBuf>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            location,
            error: None,
            suggestion: None,
            required,
        }
    }

    /// Create a failing check result
    pub fn fail(name: &str, error: &str, suggestion: Option<&str>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            location: None,
            error: Some(error.to_string()),
            suggestion: suggestion.map(String::from),
            required,
        }
    }
}

/// Overall doctor report
#[derive(Debug, Default)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check result
    pub fn add_check(&mut self, result: CheckResult) {
        self.checks.push(result);
    }

    /// Check if all required checks passed
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    /// Count passed checks
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Count failed checks
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    /// Get all failed required checks
    pub fn failed_required(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .collect()
    }
}

/// Host tools, whether they are required, and how to get them
pub const HOST_TOOLS: &[(&str, bool, &str)] = &[
    ("git", true, "Install the Xcode Command Line Tools: xcode-select --install"),
    ("make", true, "Install the Xcode Command Line Tools: xcode-select --install"),
    ("xcodebuild", true, "Install Xcode from the App Store"),
    ("cmake", true, "Install CMake, e.g. brew install cmake"),
    ("patch", true, "Install the Xcode Command Line Tools: xcode-select --install"),
    ("bash", true, "bash is required by the Libc header scripts"),
    ("perl", false, "perl is used by the xnu header generation"),
];

/// Look up a command in PATH
pub fn check_tool(name: &str, required: bool, suggestion: &str) -> CheckResult {
    match which::which(name) {
        Ok(path) => CheckResult::pass(name, Some(path), required),
        Err(_) => CheckResult::fail(name, &format!("{name} not found in PATH"), Some(suggestion), required),
    }
}

/// Check that the reference SDK has a library directory
pub fn check_reference_sdk(reference_sdk: &Path) -> CheckResult {
    let name = "Reference SDK";
    let lib = reference_sdk.join(defaults::LIB_DIR);
    if lib.is_dir() {
        CheckResult::pass(name, Some(reference_sdk.to_path_buf()), true)
    } else {
        CheckResult::fail(
            name,
            &format!("{} not found", lib.display()),
            Some("Install the matching Command Line Tools SDK or set reference_sdk in ossdk.toml"),
            true,
        )
    }
}

/// Run every check
pub fn run_doctor(reference_sdk: &Path) -> DoctorReport {
    let mut report = DoctorReport::new();
    for &(tool, required, suggestion) in HOST_TOOLS {
        report.add_check(check_tool(tool, required, suggestion));
    }
    report.add_check(check_reference_sdk(reference_sdk));
    report
}
