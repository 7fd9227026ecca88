//! Output formatting and progress indicators
//!
//! Progress bars, spinners and status lines. Everything here goes quiet
//! once [`set_quiet`] has been called; errors are printed by `main`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::orchestrator::BuildEvent;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress all non-error output
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

/// Whether output is suppressed
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Create a progress bar for package builds
pub fn create_build_bar(total: u64) -> ProgressBar {
    if is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} packages ({msg})")
            .map(|s| s.progress_chars("█▓▒░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Renders orchestrator events on a progress bar
///
/// The bar is created on [`BuildEvent::Planned`] and counts only packages
/// that actually need building.
#[derive(Debug, Default)]
pub struct BuildProgress {
    bar: std::sync::OnceLock<ProgressBar>,
}

impl BuildProgress {
    /// Progress renderer with no bar yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the display for one event
    pub fn handle(&self, event: &BuildEvent) {
        match event {
            BuildEvent::Planned { total, pending } => {
                let bar = self.bar.get_or_init(|| create_build_bar(*pending as u64));
                bar.set_message(format!("{} already built", total - pending));
            }
            BuildEvent::Skipped { package } => {
                tracing::debug!("Skipping {package}");
            }
            BuildEvent::Started { package } => {
                if let Some(bar) = self.bar.get() {
                    bar.set_message(package.clone());
                }
            }
            BuildEvent::HookStarted { package, hook } => {
                if let Some(bar) = self.bar.get() {
                    bar.set_message(format!("{package}: {hook}"));
                }
            }
            BuildEvent::Completed { package, actions } => {
                if let Some(bar) = self.bar.get() {
                    bar.inc(1);
                    bar.println(format!("  {} {package} ({actions} outputs)", status::SUCCESS));
                }
            }
        }
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}

/// Print a success line
pub fn print_success(message: &str) {
    if !is_quiet() {
        println!("{} {message}", status::SUCCESS);
    }
}

/// Print a warning line
pub fn print_warning(message: &str) {
    if !is_quiet() {
        println!("{} {message}", status::WARNING);
    }
}

/// Print an informational line
pub fn print_info(message: &str) {
    if !is_quiet() {
        println!("{} {message}", status::INFO);
    }
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    if !is_quiet() {
        println!("  {message}");
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";

    /// Pending prefix (hollow circle)
    pub const PENDING: &str = "○";
}
