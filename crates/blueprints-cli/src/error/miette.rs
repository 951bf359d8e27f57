//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) if e.is_blueprint_error() => config_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Blueprint failures get a help line pointing at the escape hatches.
fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::BlueprintNotFound(path) => miette::miette!(
            help = "create the file, pass --blueprints-path, or use --ignore-blueprints",
            "Blueprint not found: {}",
            path.display()
        ),
        ConfigError::InvalidShape(message) => miette::miette!(
            help = "a blueprint function must return a list of builds, a build, or an extensions table",
            "Invalid blueprint: {}",
            message
        ),
        // main prints the "Error in loading blueprints" line itself.
        other => miette::miette!("{}", other),
    }
}
