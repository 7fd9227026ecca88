//! User configuration directory lookup
//!
//! `OSSDK_CONFIG_DIR` overrides the platform default
//! (`$XDG_CONFIG_HOME/ossdk` on Linux, `~/Library/Application Support/ossdk`
//! on macOS).

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "OSSDK_CONFIG_DIR";

const APP_NAME: &str = "ossdk";

/// Per-user directories for ossdk
#[derive(Debug, Clone)]
pub struct SdkDirs {
    config_dir: PathBuf,
}

impl SdkDirs {
    /// Resolve directories from the environment or platform defaults
    #[must_use]
    pub fn new() -> Self {
        let config_dir = env::var(ENV_CONFIG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::platform_config_dir());
        Self { config_dir }
    }

    /// Get the config directory path
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Path of the user-level `config.toml`
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn platform_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for SdkDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_under_config_dir() {
        let dirs = SdkDirs::new();
        assert!(!dirs.config_dir().as_os_str().is_empty());
        assert!(dirs.config_path().starts_with(dirs.config_dir()));
        assert!(dirs.config_path().ends_with("config.toml"));
    }
}
