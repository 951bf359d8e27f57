//! Logging infrastructure for the blueprints CLI.
//!
//! Structured logging with the `tracing` ecosystem: verbosity flags, colour
//! control and `RUST_LOG` overrides.
//!
//! # Example
//!
//! ```rust,no_run
//! use blueprints_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Resolving builds");
//! debug!("Blueprint: {}", "./blueprints.config.lua");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "blueprints=debug,blueprints_cli=debug,blueprints_config=debug";
const QUIET_FILTER: &str = "blueprints=error,blueprints_cli=error,blueprints_config=error";
const DEFAULT_FILTER: &str = "blueprints=info,blueprints_cli=info,blueprints_config=info";

/// Initialize the tracing subscriber.
///
/// Call once at the start of the program, before any logging occurs.
///
/// The level is chosen in this order:
/// 1. `--verbose`: DEBUG for the blueprints crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`: custom filter
/// 4. Default: INFO for the blueprints crates
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
///
/// ANSI styling is on only when neither `--no-color` nor the environment
/// turns colours off.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(ansi_enabled(no_color))
        .with_writer(std::io::stderr)
        .compact();

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn ansi_enabled(no_color: bool) -> bool {
    !no_color && should_use_colors()
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored output should be enabled.
///
/// `NO_COLOR` disables colours, `FORCE_COLOR` forces them, otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stdout().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_filters_parse() {
        let _ = filter_for(true, false);
        let _ = filter_for(false, true);
        let _ = EnvFilter::new(DEFAULT_FILTER);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }

    #[test]
    #[serial]
    fn test_init_with_colors_requested_does_not_panic() {
        unsafe { std::env::set_var("FORCE_COLOR", "1") };
        assert!(ansi_enabled(false));
        init_logger(false, false, false);
        unsafe { std::env::remove_var("FORCE_COLOR") };
    }

    #[test]
    #[serial]
    fn test_ansi_follows_flag_and_environment() {
        unsafe { std::env::set_var("FORCE_COLOR", "1") };
        assert!(!ansi_enabled(true));
        unsafe { std::env::set_var("NO_COLOR", "1") };
        assert!(!ansi_enabled(false));
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_should_use_colors_respects_no_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_colors());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_should_use_colors_respects_force_color() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_colors());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }
}
