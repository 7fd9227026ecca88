//! Default configuration values

/// macOS SDK version the catalog targets
pub const SDK_VERSION: &str = "14.4";

/// Working directory holding clones, the checkpoint and the SDK root
pub const BUILD_DIR: &str = "sdk-build";

/// Name of the checkpoint file inside the build directory
pub const CHECKPOINT_FILE: &str = "built-packages.json";

/// Prefix of the assembled SDK directory (suffixed with the SDK version)
pub const SDK_DIR_PREFIX: &str = "oss-sdk";

/// Directory holding the CoreFoundation patch series
pub const PATCHES_DIR: &str = "cf-patches";

/// Project-local configuration file
pub const CONFIG_FILE: &str = "ossdk.toml";

/// Library subtrees removed from the assembled SDK
pub const EXCLUDED_LIB_SUBTREES: &[&str] = &["swift"];

/// Suffix of the stub descriptors copied from the reference SDK
pub const STUB_SUFFIX: &str = ".tbd";

/// Where the compatibility header lands inside the SDK
pub const COMPAT_HEADER_PATH: &str = "usr/include/TargetConditionals.h";

/// Library directory inside the SDK
pub const LIB_DIR: &str = "usr/lib";

/// Maximum number of download retry attempts
pub const MAX_DOWNLOAD_RETRIES: u32 = 3;

/// Default reference SDK location for a given version
pub fn reference_sdk_path(sdk_version: &str) -> String {
    format!("/Library/Developer/CommandLineTools/SDKs/MacOSX{sdk_version}.sdk")
}
