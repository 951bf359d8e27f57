use blueprints_config::{Env, Target};
use clap::ValueEnum;

/// Build environment
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum EnvArg {
    /// Optimized output: minified, no source maps by default
    #[value(name = "production")]
    Production,

    /// Development output
    #[value(name = "dev")]
    Dev,
}

/// Build target
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum TargetArg {
    /// Compile discovered test files and run them
    #[value(name = "test")]
    Test,

    /// Browser bundle
    #[value(name = "client")]
    Client,

    /// Node bundle
    #[value(name = "server")]
    Server,
}

impl From<EnvArg> for Env {
    fn from(env: EnvArg) -> Self {
        match env {
            EnvArg::Production => Env::Production,
            EnvArg::Dev => Env::Dev,
        }
    }
}

impl From<TargetArg> for Target {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Test => Target::Test,
            TargetArg::Client => Target::Client,
            TargetArg::Server => Target::Server,
        }
    }
}
