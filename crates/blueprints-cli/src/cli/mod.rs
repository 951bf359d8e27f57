//! Command-line interface definition for blueprints.
//!
//! One flat command: resolve the builds described by the flags and the
//! blueprint file, run them, and in test mode run the compiled tests.
//!
//! ```text
//! blueprints                       # client + server, dev
//! blueprints -t client -e production
//! blueprints -t test -w            # rebuild and rerun tests on change
//! blueprints -b ./ci/blueprints.lua -i
//! ```

pub mod enums;

use std::path::PathBuf;

use blueprints_config::{DEFAULT_BLUEPRINTS_PATH, InvocationOptions};
use clap::Parser;

pub use enums::*;

/// Blueprints - resolve build configurations and drive build/test runs
#[derive(Parser, Debug)]
#[command(
    name = "blueprints",
    version,
    about = "Resolve build blueprints and run them",
    long_about = "Blueprints merges a user blueprint with the built-in client, server and test\n\
                  configurations, hands the result to the bundler, and in test mode runs the\n\
                  compiled tests after every build."
)]
pub struct Cli {
    /// Path to a blueprint file (.lua, .json or .toml)
    ///
    /// The blueprint can return a list of builds, a single build, an
    /// extensions document (`extensions = true`) merged into every build, or
    /// a Lua function receiving these options and returning one of those.
    #[arg(
        short = 'b',
        long = "blueprints-path",
        visible_alias = "blueprintsPath",
        value_name = "PATH",
        default_value = DEFAULT_BLUEPRINTS_PATH
    )]
    pub blueprints_path: PathBuf,

    /// Force watching of all builds
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Ignore the blueprint file and use the default configurations
    #[arg(short = 'i', long = "ignore-blueprints", visible_alias = "ignoreBlueprints")]
    pub ignore_blueprints: bool,

    /// The environment to build for
    #[arg(short = 'e', long, value_enum, default_value = "dev")]
    pub env: EnvArg,

    /// The target to build; both client and server when omitted
    #[arg(short = 't', long, value_enum)]
    pub target: Option<TargetArg>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// The immutable options handed to resolution.
    pub fn options(&self) -> InvocationOptions {
        InvocationOptions {
            blueprints_path: Some(self.blueprints_path.clone()),
            watch: self.watch,
            ignore_blueprints: self.ignore_blueprints,
            env: self.env.into(),
            target: self.target.map(Into::into),
        }
    }
}
