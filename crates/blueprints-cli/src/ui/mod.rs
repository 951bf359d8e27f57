//! Terminal output for status lines, build errors and the test banner.
//!
//! Status lines and errors print to stderr so bundler output on stdout stays
//! separate. The RUNNING TESTS banner goes to stdout, next to the test runner
//! output it introduces. `--quiet` silences everything except errors.
//!
//! # Examples
//!
//! ```no_run
//! use blueprints_cli::ui;
//!
//! ui::init_colors(false);
//! ui::set_quiet(false);
//! ui::step("Reading Blueprints ./blueprints.config.lua");
//! ui::tests_banner();
//! ui::error("ERROR IN BUILD. Aborting.");
//! ```

mod format;
mod messages;

use owo_colors::{OwoColorize, Style};
use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_build_errors, format_duration, format_test_summary, tests_banner_text};
pub use messages::{error, step, success, tests_banner, warning};

static COLORS: AtomicBool = AtomicBool::new(true);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Initialize colour support based on the environment.
///
/// Colours stay off with `--no-color`, `NO_COLOR`, or a terminal without
/// colour support. CI disables them unless `FORCE_COLOR` is set.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color
        && crate::logger::should_use_colors()
        && (!is_ci() || std::env::var("FORCE_COLOR").is_ok());
    COLORS.store(enabled, Ordering::Relaxed);
}

/// Silence status lines and the test banner; errors still print.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

pub(crate) fn paint(text: &str, style: Style) -> String {
    if colors_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
