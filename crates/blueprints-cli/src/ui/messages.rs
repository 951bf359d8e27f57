//! Status message functions for terminal output.

use super::{format::tests_banner_text, is_quiet, paint};
use owo_colors::Style;

/// Print a progress line in the `...message` style.
///
/// ```no_run
/// use blueprints_cli::ui::step;
///
/// step("cwd /home/me/app");
/// ```
pub fn step(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("...{}", message);
}

/// Print a success message to stderr.
pub fn success(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("{} {}", paint("✓", Style::new().green().bold()), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!(
        "{} {}",
        paint("⚠", Style::new().yellow().bold()),
        paint(message, Style::new().yellow())
    );
}

/// Print an error message to stderr in red.
///
/// ```no_run
/// use blueprints_cli::ui::error;
///
/// error("ERROR IN BUILD. Aborting.");
/// ```
pub fn error(message: &str) {
    eprintln!("{}", paint(message, Style::new().red()));
}

/// Print the magenta banner that separates build output from test output.
///
/// Goes to stdout so it interleaves with the test runner output.
pub fn tests_banner() {
    if is_quiet() {
        return;
    }
    println!("{}", paint(&tests_banner_text(), Style::new().magenta()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        step("Step message");
        success("Success message");
        warning("Warning message");
        error("Error message");
        tests_banner();
    }
}
