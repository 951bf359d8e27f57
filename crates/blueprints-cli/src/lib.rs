//! Blueprints CLI - resolve build blueprints and drive build/test runs.
//!
//! # Architecture
//!
//! - [`cli`] - flag parsing into `InvocationOptions`
//! - [`settings`] - which bundler and test runner commands to use
//! - [`engine`] - the build engine seam and its bundler-process implementation
//! - [`supervisor`] - submits the resolved builds and reacts to completions
//! - [`testing`] - test discovery, reruns and the transient output directory
//! - [`error`], [`logger`], [`ui`] - errors, tracing setup, terminal output
//!
//! Resolution itself lives in `blueprints-config`.
//!
//! # Example
//!
//! ```rust,no_run
//! use blueprints_cli::{cli::Cli, error::Result, logger};
//! use clap::Parser;
//!
//! # async fn example() -> Result<()> {
//! let cli = Cli::parse();
//! logger::init_logger(cli.verbose, cli.quiet, cli.no_color);
//! blueprints_cli::run(&cli).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod logger;
pub mod settings;
pub mod supervisor;
pub mod testing;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result, TestError};

use blueprints_config::{ConfigResolver, TEST_OUTPUT_DIR};
use engine::ProcessEngine;
use settings::RunnerSettings;
use supervisor::BuildSupervisor;
use testing::{ProcessTestEngine, TestLifecycle, TransientWorkspace};

/// Resolve the builds for `cli` in the current directory and run them.
///
/// In test mode the `./.test` directory is owned for the whole run and
/// removed on every exit path.
pub async fn run(cli: &cli::Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let options = cli.options();

    ui::step(&format!("Reading Blueprints {}", cli.blueprints_path.display()));
    ui::step(&format!("cwd {}", cwd.display()));

    let settings = RunnerSettings::load(&cwd)?;
    let builds = ConfigResolver::new(&cwd).resolve(&options)?;
    let names: Vec<&str> = builds.iter().filter_map(|build| build.name()).collect();
    ui::step(&format!("Resolved {}", names.join(", ")));
    let watch = options.watch || builds.watch_enabled();
    let engine = ProcessEngine::new(&settings, &cwd);

    if !options.is_test() {
        return BuildSupervisor::<_, ProcessTestEngine>::new(engine, watch)
            .run(builds)
            .await;
    }

    let workspace = TransientWorkspace::acquire(cwd.join(TEST_OUTPUT_DIR));
    workspace.install_interrupt_handler();
    workspace.install_panic_hook();

    let tests = ProcessTestEngine::new(settings.test_runner.clone(), settings.reporter);
    let mut supervisor =
        BuildSupervisor::new(engine, watch).with_tests(TestLifecycle::new(tests, workspace));
    let result = supervisor.run(builds).await;
    supervisor.shutdown();
    result
}
