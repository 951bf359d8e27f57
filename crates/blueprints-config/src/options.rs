//! Invocation options: the single input to build resolution.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default blueprint location, relative to the working directory.
pub const DEFAULT_BLUEPRINTS_PATH: &str = "./blueprints.config.lua";

/// Environment a build is produced for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    Production,
    #[default]
    Dev,
}

impl Env {
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Production => "production",
            Env::Dev => "dev",
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Env {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Env::Production),
            "dev" => Ok(Env::Dev),
            other => Err(ConfigError::invalid(
                "env",
                format!("'{other}' is not one of: production, dev"),
            )),
        }
    }
}

/// Build category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Test,
    Client,
    Server,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Test => "test",
            Target::Client => "client",
            Target::Server => "server",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Target::Test),
            "client" => Ok(Target::Client),
            "server" => Ok(Target::Server),
            other => Err(ConfigError::invalid(
                "target",
                format!("'{other}' is not one of: test, client, server"),
            )),
        }
    }
}

/// Options parsed from the command line.
///
/// Serialized with the flag names (`blueprintsPath`, `ignoreBlueprints`, ...)
/// so a blueprint function sees the same keys a user types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationOptions {
    pub blueprints_path: Option<PathBuf>,
    pub watch: bool,
    pub ignore_blueprints: bool,
    pub env: Env,
    pub target: Option<Target>,
}

impl Default for InvocationOptions {
    fn default() -> Self {
        Self {
            blueprints_path: Some(PathBuf::from(DEFAULT_BLUEPRINTS_PATH)),
            watch: false,
            ignore_blueprints: false,
            env: Env::Dev,
            target: None,
        }
    }
}

impl InvocationOptions {
    pub fn is_production(&self) -> bool {
        self.env == Env::Production
    }

    pub fn is_test(&self) -> bool {
        self.target == Some(Target::Test)
    }
}
