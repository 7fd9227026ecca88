//! Build hooks for the built-in catalog
//!
//! Most packages only need their headers copied; the ones here have to be
//! patched for the public SDK or have their headers generated by the
//! project's own build system first.

use std::path::{Path, PathBuf};

use crate::core::hooks::{HookContext, HookRegistry};
use crate::error::HookError;
use crate::infra::filesystem;
use crate::infra::process::CommandSpec;

const ARCH: &str = "arm64";
const DARWIN_KERNEL_VERSION: &str = "23.1.0";
const MIN_MACOS_VERSION: &str = "14.0.0";

/// Registry with every hook the built-in catalog references
pub fn builtin_registry() -> HookRegistry {
    HookRegistry::new()
        .with("coreos_makefiles", coreos_makefiles)
        .with("architecture", architecture)
        .with("availability_versions", availability_versions)
        .with("cctools", cctools)
        .with("icu", icu)
        .with("libc", libc)
        .with("libm", libm)
        .with("libinfo", libinfo)
        .with("dyld", dyld)
        .with("launchd", launchd)
        .with("libmalloc", libmalloc)
        .with("libxslt", libxslt)
        .with("ncurses", ncurses)
        .with("objc4", objc4)
        .with("security", security)
        .with("xnu", xnu)
        .with("corefoundation", corefoundation)
}

/// Line-wise literal replacement inside the workspace
fn replace(ctx: &HookContext<'_>, file: &str, find: &str, with: &str) -> Result<(), HookError> {
    if !filesystem::replace_in_file(&ctx.path(file), find, with)? {
        tracing::debug!("{}: '{find}' not found in {file}", ctx.package);
    }
    Ok(())
}

fn dstroot(path: &Path) -> String {
    format!("DSTROOT={}", path.display())
}

fn framework(ctx: &HookContext<'_>, name: &str) -> PathBuf {
    ctx.settings
        .reference_sdk
        .join("System/Library/Frameworks")
        .join(format!("{name}.framework"))
}

fn coreos_makefiles(ctx: &HookContext<'_>) -> Result<(), HookError> {
    ctx.run(CommandSpec::new("make").args(["DSTROOT=out", "install"]))?;

    let xcconfig = "out/Makefiles/CoreOS/Xcode/BSD.xcconfig";
    replace(ctx, xcconfig, "SDKROOT = macosx.internal", "SDKROOT = macosx")?;
    replace(ctx, xcconfig, "ARCHS_STANDARD_32_64_BIT", "ARCHS_STANDARD")
}

fn architecture(ctx: &HookContext<'_>) -> Result<(), HookError> {
    let out = ctx.path("out");
    ctx.run(
        CommandSpec::new("make")
            .arg("installhdrs")
            .env("DSTROOT", out.display().to_string()),
    )?;
    Ok(())
}

fn availability_versions(ctx: &HookContext<'_>) -> Result<(), HookError> {
    ctx.run(CommandSpec::new("make").arg("installhdrs"))?;
    Ok(())
}

fn cctools(ctx: &HookContext<'_>) -> Result<(), HookError> {
    replace(
        ctx,
        "xcode/macho_dynamic.xcconfig",
        "SDKROOT=macosx.internal",
        "SDKROOT=macosx",
    )?;
    ctx.run(
        CommandSpec::new("xcodebuild")
            .args(["-target", "macho dynamic", "installhdrs"])
            .arg(dstroot(&ctx.path("out"))),
    )?;
    Ok(())
}

fn icu(ctx: &HookContext<'_>) -> Result<(), HookError> {
    replace(ctx, "makefile", "xcrun --sdk macosx --find", "echo -n")?;
    replace(
        ctx,
        "makefile",
        "xcrun --sdk macosx.internal --show-sdk-path",
        "xcrun --sdk macosx --show-sdk-path",
    )?;
    ctx.run(CommandSpec::new("make").args([
        format!("MAC_OS_X_VERSION_MIN_REQUIRED={MIN_MACOS_VERSION}"),
        format!("ICU_TARGET_VERSION=-mmacosx-version-min={MIN_MACOS_VERSION}"),
        "RC_XBS=YES".to_string(),
        "installhdrs".to_string(),
    ]))?;
    Ok(())
}

fn libc(ctx: &HookContext<'_>) -> Result<(), HookError> {
    filesystem::create_dir_all(&ctx.path("out"))?;
    ctx.run(
        CommandSpec::new("bash")
            .arg("xcodescripts/headers.sh")
            .env("SRCROOT", ctx.workspace.display().to_string())
            .env("DSTROOT", "out")
            .env("PUBLIC_HEADERS_FOLDER_PATH", "include")
            .env("PRIVATE_HEADERS_FOLDER_PATH", "include"),
    )?;

    let ar = ctx.path("out/usr/include/ar.h");
    if let Some(parent) = ar.parent() {
        filesystem::create_dir_all(parent)?;
    }
    filesystem::copy_file(&ctx.path("out/usr/local/include/ar.h"), &ar)?;
    filesystem::remove_dir_all(&ctx.path("out/usr/local"))?;
    Ok(())
}

fn libm(ctx: &HookContext<'_>) -> Result<(), HookError> {
    ctx.run(
        CommandSpec::new("xcodebuild")
            .args(["-target", "InstallHeaders", "installhdrs"])
            .arg(dstroot(&ctx.path("out"))),
    )?;
    Ok(())
}

fn libinfo(ctx: &HookContext<'_>) -> Result<(), HookError> {
    let script = "xcodescripts/install_files.sh";
    replace(ctx, script, r#"-o "$INSTALL_OWNER" -g "$INSTALL_GROUP""#, "")?;
    replace(ctx, script, "ln -h", "ln -n")?;

    filesystem::create_dir_all(&ctx.path("out"))?;
    ctx.run(CommandSpec::new("sh").arg(script).env("DSTROOT", "out"))?;
    Ok(())
}

fn dyld(ctx: &HookContext<'_>) -> Result<(), HookError> {
    let dyld_h = "include/mach-o/dyld.h";
    replace(ctx, dyld_h, ", bridgeos(5.0)", "")?;
    replace(ctx, dyld_h, "__API_UNAVAILABLE(bridgeos) ", "")?;
    replace(ctx, dyld_h, "DYLD_EXCLAVEKIT_UNAVAILABLE ", "")?;
    replace(ctx, "include/mach-o/dyld_priv.h", ", bridgeos(3.0)", "")
}

fn launchd(ctx: &HookContext<'_>) -> Result<(), HookError> {
    let makefiles = ctx.dependency("CoreOSMakefiles")?.join("out");
    replace(
        ctx,
        "xcconfigs/common.xcconfig",
        "<DEVELOPER_DIR>",
        &makefiles.display().to_string(),
    )?;
    ctx.run(
        CommandSpec::new("xcodebuild")
            .args(["-arch", ARCH, "-target", "launchd_libs", "installhdrs"])
            .arg(dstroot(&ctx.path("out"))),
    )?;
    Ok(())
}

fn libmalloc(ctx: &HookContext<'_>) -> Result<(), HookError> {
    let malloc_h = "include/malloc/malloc.h";
    replace(ctx, malloc_h, "TARGET_OS_EXCLAVECORE", "0")?;
    replace(ctx, malloc_h, "TARGET_OS_EXCLAVEKIT", "0")
}

fn libxslt(ctx: &HookContext<'_>) -> Result<(), HookError> {
    filesystem::copy_file(
        &ctx.path("Pregenerated Files/include/libxslt/xsltconfig.h"),
        &ctx.path("libxslt/libexslt/exsltconfig.h"),
    )?;
    Ok(())
}

fn ncurses(ctx: &HookContext<'_>) -> Result<(), HookError> {
    ctx.run(
        CommandSpec::new("make")
            .args(["DESTDIR=out", "install.includes"])
            .current_dir("ncurses"),
    )?;
    Ok(())
}

fn objc4(ctx: &HookContext<'_>) -> Result<(), HookError> {
    replace(ctx, "objc.xcodeproj/project.pbxproj", "macosx.internal", "macosx")?;
    ctx.run(CommandSpec::new("xcodebuild").args(["-target", "objc", "installhdrs", "DSTROOT=out"]))?;
    Ok(())
}

/// Rebuild the reference Security.framework with headers from the sources
fn security(ctx: &HookContext<'_>) -> Result<(), HookError> {
    let reference = framework(ctx, "Security");
    let needed: Vec<String> = filesystem::list_dir(&reference.join("Versions/A/Headers"))?
        .iter()
        .filter(|p| p.extension().is_some_and(|e| e == "h"))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();

    let dest = ctx.path("out/Security.framework");
    filesystem::copy_tree(&reference, &dest, |_| true)?;

    let headers = dest.join("Versions/A/Headers");
    filesystem::remove_dir_all(&headers)?;
    filesystem::create_dir_all(&headers)?;

    let macos = ctx.path("header_symlinks/macOS/Security");
    let common = ctx.path("header_symlinks/Security");
    for header in &needed {
        let src = [macos.join(header), common.join(header)]
            .into_iter()
            .find(|p| filesystem::entry_exists(p))
            .ok_or_else(|| HookError::Failed(format!("Unable to find {header} in Security sources")))?;
        filesystem::copy_resolved(&src, &headers.join(header))?;
    }
    tracing::debug!("Security: {} headers", needed.len());
    Ok(())
}

fn xnu_make(ctx: &HookContext<'_>, sdkroot: &Path) -> CommandSpec {
    let version = &ctx.settings.sdk_version;
    CommandSpec::new("make").args([
        "PLATFORM=MacOSX".to_string(),
        format!("SDKVERSION={version}"),
        format!("HOST_OS_VERSION={version}"),
        format!("ARCH={ARCH}"),
        format!("ARCH_CONFIGS={ARCH}"),
        format!("SDKROOT_RESOLVED={}", sdkroot.display()),
        format!("HOST_SDKROOT_RESOLVED={}", sdkroot.display()),
        "BUILT_PRODUCTS_DIR=.".to_string(),
        format!("DSTROOT=\"{}\"", ctx.path("out").display()),
        format!("RC_DARWIN_KERNEL_VERSION={DARWIN_KERNEL_VERSION}"),
        "installhdrs".to_string(),
    ])
}

/// Kernel and libsyscall headers
///
/// The first make pass against the reference SDK is expected to fail part
/// way; it generates what the second pass against the local `sdk/` needs.
fn xnu(ctx: &HookContext<'_>) -> Result<(), HookError> {
    let makefiles = ctx.dependency("CoreOSMakefiles")?.join("out");
    replace(
        ctx,
        "libsyscall/Libsyscall.xcconfig",
        "<DEVELOPER_DIR>",
        &makefiles.display().to_string(),
    )?;

    let libkern = "libkern/libkern/Makefile";
    replace(ctx, libkern, "EXPORT_MI_GEN_LIST = version.h", "#EXPORT_MI_GEN_LIST = version.h")?;
    replace(ctx, libkern, "version.h: ", "#version.h: ")?;
    replace(ctx, libkern, "\t@$(LOG_GENERATE) ", "#\t@$(LOG_GENERATE) ")?;
    replace(ctx, libkern, "\t$(_v)install ", "#\t$(_v)install ")?;
    replace(ctx, libkern, "\t$(_v)$(NEWVERS) ", "#\t$(_v)$(NEWVERS) ")?;

    replace(ctx, "makedefs/MakeInc.cmd", " ExclaveKit ExclaveCore ", " ")?;

    let availability = ctx
        .dependency("AvailabilityVersions")?
        .join("dst/usr/local/libexec/availability.pl");
    let libexec = ctx.path("sdk/usr/local/libexec");
    filesystem::create_dir_all(&libexec)?;
    filesystem::copy_resolved(&availability, &libexec.join("availability.pl"))?;

    ctx.run(xnu_make(ctx, &ctx.settings.reference_sdk).tolerate_failure())?;
    ctx.run(xnu_make(ctx, &ctx.path("sdk")))?;

    ctx.run(
        CommandSpec::new("xcodebuild")
            .args(["-arch", ARCH, "-target", "Build", "installhdrs"])
            .arg(dstroot(&ctx.path("libsyscall/out")))
            .current_dir("libsyscall"),
    )?;

    filesystem::remove_dir_all(&ctx.path("out/usr/local"))?;
    filesystem::remove_dir_all(&ctx.path("libsyscall/out/usr/local"))?;
    Ok(())
}

/// CoreFoundation headers from swift-corelibs-foundation
///
/// The patch series adapts the open-source tree to the platform layout;
/// the framework binary is replaced by the reference SDK's stub.
fn corefoundation(ctx: &HookContext<'_>) -> Result<(), HookError> {
    let patches_dir = &ctx.settings.patches_dir;
    if !patches_dir.is_dir() {
        return Err(HookError::Failed(format!(
            "CoreFoundation patch directory {} not found",
            patches_dir.display()
        )));
    }
    for patch in filesystem::list_dir(patches_dir)? {
        ctx.run(CommandSpec::new("patch").args(["-p1", "-i"]).arg(patch.display().to_string()))?;
    }

    let icu = ctx.dependency("ICU")?.join("build/usr/local/include");
    let dispatch = ctx.dependency("libdispatch")?.join("private");
    let dyld = ctx.dependency("dyld")?.join("include");

    replace(
        ctx,
        "CoreFoundation/PlugIn.subproj/CFBundlePriv.h",
        "#if (TARGET_OS_MAC",
        "#if (0",
    )?;
    replace(
        ctx,
        "CoreFoundation/Base.subproj/DarwinSymbolAliases",
        "__TMC15SwiftFoundation19_NSCFConstantString",
        "#__TMC15SwiftFoundation19_NSCFConstantString",
    )?;

    let build = ctx.path("CoreFoundation/build");
    filesystem::create_dir_all(&build)?;
    let cflags = format!(
        "-Wno-error=undef-prefix -DINCLUDE_OBJC=1 -I{} -I{} -I{}",
        icu.display(),
        dispatch.display(),
        dyld.display()
    );

    ctx.run(
        CommandSpec::new("cmake")
            .args(["-DBUILD_SHARED_LIBS=ON", "-DCF_ENABLE_LIBDISPATCH=OFF", ".."])
            .env("CFLAGS", &cflags)
            .current_dir(&build),
    )?;
    ctx.run(
        CommandSpec::new("make")
            .arg("CoreFoundation_POPULATE_HEADERS")
            .env("CFLAGS", &cflags)
            .current_dir(&build),
    )?;

    let fw = build.join("CoreFoundation.framework");
    filesystem::remove_file(&fw.join("CoreFoundation"))?;
    filesystem::copy_resolved(
        &framework(ctx, "CoreFoundation").join("Versions/A/CoreFoundation.tbd"),
        &fw.join("Versions/A/CoreFoundation.tbd"),
    )?;
    filesystem::symlink(
        Path::new("Versions/Current/CoreFoundation.tbd"),
        &fw.join("CoreFoundation.tbd"),
    )?;
    Ok(())
}
