//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod check;
pub mod clean;
pub mod doctor;
pub mod finalize;
pub mod list;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::core::catalog::Catalog;
use crate::core::config::{Layout, SdkConfig};
use crate::packages;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build packages into the SDK, then finalize it
    Build {
        /// Build only this package (repeatable)
        #[arg(long, value_name = "PACKAGE")]
        only: Vec<String>,

        /// Do not run the finalize step
        #[arg(long)]
        skip_finalize: bool,
    },

    /// Add the compatibility header and reference stubs to the SDK
    Finalize,

    /// List catalog packages and their build status
    List,

    /// Validate catalog and configuration without building
    Check,

    /// Remove build state for a fresh build
    Clean {
        /// Remove only the checkpoint, keeping the SDK tree
        #[arg(long)]
        checkpoint_only: bool,
    },

    /// Check host tools and the reference SDK
    Doctor,
}

/// Resolved configuration shared by every command
#[derive(Debug, Clone)]
pub struct Session {
    /// Directory relative settings are resolved against
    pub base: PathBuf,
    /// Effective configuration
    pub config: SdkConfig,
    /// Paths derived from the configuration
    pub layout: Layout,
}

impl Session {
    /// Resolve the layout for `config` relative to `base`
    pub fn new(base: PathBuf, config: SdkConfig) -> Self {
        let layout = Layout::from_config(&config, &base);
        Self {
            base,
            config,
            layout,
        }
    }

    /// Catalog selected by the configuration
    pub fn catalog(&self) -> Result<Catalog> {
        packages::load_catalog(&self.config, &self.base)
    }
}

impl Commands {
    /// Execute the command
    pub async fn run(self, session: &Session) -> Result<()> {
        match self {
            Self::Build {
                only,
                skip_finalize,
            } => build::execute(session, &only, skip_finalize).await,
            Self::Finalize => finalize::execute(session).await,
            Self::List => list::execute(session),
            Self::Check => check::execute(session),
            Self::Clean { checkpoint_only } => clean::execute(session, checkpoint_only),
            Self::Doctor => doctor::execute(session),
        }
    }
}
