//! Error handling for the blueprints CLI.
//!
//! `CliError` is the top-level type every fallible operation returns.
//! Domain-specific enums (`BuildError`, `TestError`) carry the details and
//! convert automatically via `#[from]`. Configuration errors come straight
//! from `blueprints-config`.
//!
//! # Example
//!
//! ```rust,no_run
//! use blueprints_cli::error::{BuildError, Result};
//!
//! fn require_bundler(command: &[String]) -> Result<()> {
//!     if command.is_empty() {
//!         return Err(BuildError::NoBundler.into());
//!     }
//!     Ok(())
//! }
//! ```

pub mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use blueprints_config::ConfigError;
pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Blueprint loading or build resolution failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The build engine could not run, or reported errors outside watch mode
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// The test engine could not run
    #[error("Test error: {0}")]
    Test(#[from] TestError),

    /// Runner settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] Box<figment::Error>),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        CliError::Settings(Box::new(err))
    }
}

/// Build engine errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The bundler command is empty
    #[error("No bundler command configured\n\nHint: Set BLUEPRINTS_BUNDLER or 'bundler' in blueprints-runner.toml")]
    NoBundler,

    /// The bundler process could not be started
    #[error("Failed to start bundler '{program}': {source}\n\nHint: Check that the bundler is installed and on PATH")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// One or more builds reported errors and watch mode is off
    #[error("{count} build error(s); aborting")]
    Aborted { count: usize },

    /// The engine stopped without reporting a result
    #[error("Build engine stopped before reporting a result")]
    NoResult,
}

/// Test engine errors.
#[derive(Debug, Error)]
pub enum TestError {
    /// The test runner command is empty
    #[error("No test runner configured\n\nHint: Set BLUEPRINTS_TEST_RUNNER or 'test_runner' in blueprints-runner.toml")]
    NoRunner,

    /// The test runner process could not be started
    #[error("Failed to start test runner '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A compiled test artifact could not be read
    #[error("Failed to load test artifact {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
