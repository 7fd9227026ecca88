//! External process invocation
//!
//! Runs a command to completion with stdout and stderr merged into one
//! captured stream. A failing command aborts the caller unless it was marked
//! failure-tolerant, in which case the failure is only logged.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::ProcessError;

/// A command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Environment overrides, merged into the inherited environment
    pub env: Vec<(String, String)>,
    /// Working directory
    pub cwd: Option<PathBuf>,
    /// Log a non-zero exit instead of failing
    pub tolerate_failure: bool,
}

impl CommandSpec {
    /// Create a command with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            tolerate_failure: false,
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Override one environment variable
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Run inside `dir`
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Mark the invocation as failure-tolerant
    #[must_use]
    pub fn tolerate_failure(mut self) -> Self {
        self.tolerate_failure = true;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    /// Whether the process exited successfully
    pub success: bool,
    /// Merged stdout and stderr
    pub output: String,
}

/// Something that can run commands
///
/// Build hooks only talk to this trait so they can be exercised with a
/// recording runner in tests.
pub trait ProcessRunner {
    /// Run `spec` to completion
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, ProcessError>;
}

/// Runs commands on the host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        let command = spec.to_string();
        let capture_err = |e: std::io::Error| ProcessError::Capture {
            command: command.clone(),
            error: e.to_string(),
        };

        // One file behind both descriptors keeps the interleaving intact
        let mut capture = tempfile::tempfile().map_err(capture_err)?;
        let stderr = capture.try_clone().map_err(capture_err)?;
        let stdout = capture.try_clone().map_err(capture_err)?;

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        if let Some(ref cwd) = spec.cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!("Running: {command}");
        let status = cmd.status().map_err(|e| ProcessError::Spawn {
            command: command.clone(),
            error: e.to_string(),
        })?;

        capture.seek(SeekFrom::Start(0)).map_err(capture_err)?;
        let mut bytes = Vec::new();
        capture.read_to_end(&mut bytes).map_err(capture_err)?;

        let result = ProcessOutput {
            code: status.code(),
            success: status.success(),
            output: String::from_utf8_lossy(&bytes).into_owned(),
        };
        check_exit(spec, result)
    }
}

/// Turn a finished process into the caller-visible result
///
/// Shared by every runner so the failure-tolerant rule lives in one place.
pub fn check_exit(spec: &CommandSpec, result: ProcessOutput) -> Result<ProcessOutput, ProcessError> {
    if result.success {
        return Ok(result);
    }

    let code = result.code.unwrap_or(-1);
    if spec.tolerate_failure {
        tracing::warn!("'{spec}' exited with code {code}, continuing");
        return Ok(result);
    }

    Err(ProcessError::NonZeroExit {
        command: spec.to_string(),
        code,
        output: result.output,
    })
}
