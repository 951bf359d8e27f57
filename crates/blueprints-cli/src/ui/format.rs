//! Formatting utilities for durations, build errors and test summaries.

use crate::engine::BuildDiagnostic;
use crate::testing::TestSummary;
use std::time::Duration;

/// Format duration in human-readable format.
///
/// Converts to the most appropriate unit (ms, s, m:s).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use blueprints_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

/// The boxed "RUNNING TESTS" banner, uncoloured.
pub fn tests_banner_text() -> String {
    [
        "",
        "   ******************************",
        "   *       RUNNING TESTS        *",
        "   ******************************",
    ]
    .join("\n")
}

/// One line per diagnostic, in the order the engine reported them.
pub fn format_build_errors(errors: &[BuildDiagnostic]) -> String {
    errors
        .iter()
        .map(|diagnostic| format!("[{}] {}", diagnostic.build, diagnostic.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `3 passing, 1 failing (120ms)` followed by the failing artifacts.
pub fn format_test_summary(summary: &TestSummary) -> String {
    let mut out = format!(
        "{} passing, {} failing ({})",
        summary.passed,
        summary.failed(),
        format_duration(summary.duration)
    );
    for failure in &summary.failures {
        out.push_str("\n  ✗ ");
        out.push_str(failure);
    }
    out
}
