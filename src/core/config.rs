//! SDK build configuration
//!
//! Reads `ossdk.toml`. Every setting is optional; unset values fall back to
//! the constants in [`crate::config`]. Command-line flags are applied on top
//! by the CLI layer.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{defaults, urls};
use crate::error::ConfigError;
use crate::infra::dirs::SdkDirs;

/// Settings for one SDK build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SdkConfig {
    /// macOS SDK version, e.g. "14.4"
    pub sdk_version: Option<String>,

    /// Working directory for clones, checkpoint and SDK root
    pub build_dir: Option<PathBuf>,

    /// Installed SDK used as the source of stubs and framework skeletons
    pub reference_sdk: Option<PathBuf>,

    /// Monorepo URL
    pub distribution_repo: Option<String>,

    /// URL of the platform-compatibility header
    pub compat_header_url: Option<String>,

    /// Expected SHA256 of the compatibility header
    pub compat_header_sha256: Option<String>,

    /// Library subtrees removed during finalization
    pub excluded_lib_subtrees: Option<Vec<String>>,

    /// Directory with the CoreFoundation patch series
    pub patches_dir: Option<PathBuf>,

    /// Custom catalog file replacing the built-in one
    pub catalog: Option<PathBuf>,
}

impl SdkConfig {
    /// Find and load the configuration
    ///
    /// Uses `explicit` when given, otherwise `./ossdk.toml`, otherwise the
    /// user config directory. No file at all means defaults.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    error: "file does not exist".to_string(),
                });
            }
            return Self::load_from_path(path);
        }

        let local = cwd.join(defaults::CONFIG_FILE);
        if local.exists() {
            return Self::load_from_path(&local);
        }

        Self::load_from_path(&SdkDirs::new().config_path())
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Effective SDK version
    pub fn sdk_version(&self) -> &str {
        self.sdk_version.as_deref().unwrap_or(defaults::SDK_VERSION)
    }

    /// Effective reference SDK path
    pub fn reference_sdk(&self) -> PathBuf {
        self.reference_sdk
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::reference_sdk_path(self.sdk_version())))
    }

    /// Effective monorepo URL
    pub fn distribution_repo(&self) -> &str {
        self.distribution_repo
            .as_deref()
            .unwrap_or(urls::DISTRIBUTION_REPO)
    }

    /// Effective compatibility header URL
    pub fn compat_header_url(&self) -> &str {
        self.compat_header_url
            .as_deref()
            .unwrap_or(urls::COMPAT_HEADER)
    }

    /// Effective list of excluded library subtrees
    pub fn excluded_lib_subtrees(&self) -> Vec<String> {
        self.excluded_lib_subtrees.clone().unwrap_or_else(|| {
            defaults::EXCLUDED_LIB_SUBTREES
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }

    /// Monorepo tag matching the SDK version, e.g. `macos-144`
    pub fn distribution_tag(&self) -> String {
        format!("macos-{}", self.sdk_version().replace('.', ""))
    }
}

/// Every working path of a build, resolved to absolute form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Working directory for all clones
    pub build_root: PathBuf,
    /// The SDK tree being assembled
    pub sdk_root: PathBuf,
    /// Persisted checkpoint
    pub checkpoint_path: PathBuf,
    /// Shared monorepo checkout
    pub monorepo_dir: PathBuf,
    /// CoreFoundation patch series
    pub patches_dir: PathBuf,
    /// Reference SDK installation
    pub reference_sdk: PathBuf,
}

impl Layout {
    /// Resolve the layout, interpreting relative settings against `base`
    pub fn from_config(config: &SdkConfig, base: &Path) -> Self {
        let build_root = base.join(
            config
                .build_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(defaults::BUILD_DIR)),
        );
        let patches_dir = base.join(
            config
                .patches_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(defaults::PATCHES_DIR)),
        );

        Self {
            sdk_root: build_root.join(format!(
                "{}{}",
                defaults::SDK_DIR_PREFIX,
                config.sdk_version()
            )),
            checkpoint_path: build_root.join(defaults::CHECKPOINT_FILE),
            monorepo_dir: build_root.join(repo_dir_name(config.distribution_repo())),
            patches_dir,
            reference_sdk: base.join(config.reference_sdk()),
            build_root,
        }
    }

    /// Checkout directory for a package with an alternate repository
    pub fn alternate_repo_dir(&self, url: &str) -> PathBuf {
        self.build_root.join(repo_dir_name(url))
    }
}

/// Directory name `git clone` would pick for `url`
pub fn repo_dir_name(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}
