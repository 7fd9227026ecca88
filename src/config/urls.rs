//! Upstream source and asset URLs

/// Monorepo carrying most packages as submodules
pub const DISTRIBUTION_REPO: &str = "https://github.com/apple-oss-distributions/distribution-macOS";

/// Platform-compatibility header not shipped by any package
pub const COMPAT_HEADER: &str =
    "https://github.com/ziglang/zig/raw/0.13.0/lib/libc/include/any-macos-any/TargetConditionals.h";
