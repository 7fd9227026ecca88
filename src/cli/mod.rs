//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::core::config::SdkConfig;
use commands::{Commands, Session};

/// ossdk - assemble a macOS SDK from open-source components
///
/// Builds headers from Apple's open-source releases, copies them into an
/// SDK tree and completes it with stubs from an installed reference SDK.
#[derive(Parser, Debug)]
#[command(name = "ossdk")]
#[command(author, version, about, long_about = None)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    ")"
))]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: ./ossdk.toml, then the user config)
    #[arg(long, global = true, env = "OSSDK_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory for clones, checkpoint and SDK root
    #[arg(long, global = true, env = "OSSDK_BUILD_DIR", value_name = "PATH")]
    pub build_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Log level selected by `-v`/`-q`
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let Some(command) = self.command else {
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            return Ok(());
        };

        output::set_quiet(self.quiet);

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let mut config = SdkConfig::discover(self.config.as_deref(), &cwd)
            .context("Failed to load configuration")?;
        if let Some(dir) = self.build_dir {
            config.build_dir = Some(dir);
        }

        command.run(&Session::new(cwd, config)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::parse_from(["ossdk", "-vv", "list"]);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);

        let cli = Cli::parse_from(["ossdk", "list", "-q"]);
        assert_eq!(cli.log_level(), tracing::Level::ERROR);

        let cli = Cli::parse_from(["ossdk", "list"]);
        assert_eq!(cli.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_build_flags() {
        let cli = Cli::parse_from([
            "ossdk",
            "--build-dir",
            "/tmp/b",
            "build",
            "--only",
            "dyld",
            "--only",
            "xnu",
            "--skip-finalize",
        ]);

        assert_eq!(cli.build_dir, Some(PathBuf::from("/tmp/b")));
        match cli.command {
            Some(Commands::Build {
                only,
                skip_finalize,
            }) => {
                assert_eq!(only, vec!["dyld", "xnu"]);
                assert!(skip_finalize);
            }
            other => panic!("Expected build command, got {other:?}"),
        }
    }

    #[test]
    fn test_clap_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
