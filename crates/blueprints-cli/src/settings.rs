//! Runner settings: which external commands do the bundling and testing.
//!
//! Merged from several sources, later ones winning:
//! defaults, `blueprints-runner.toml` in the working directory, then
//! `BLUEPRINTS_*` environment variables.

use crate::error::Result;
use crate::testing::Reporter;
use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "blueprints-runner.toml";

/// Environment variable prefix (`BLUEPRINTS_BUNDLER`, `BLUEPRINTS_REPORTER`, ...).
pub const ENV_PREFIX: &str = "BLUEPRINTS_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Bundler command; receives one build as JSON on stdin.
    #[serde(default = "default_bundler")]
    pub bundler: CommandLine,

    /// Test runner command; receives one compiled test artifact on stdin.
    #[serde(default = "default_test_runner")]
    pub test_runner: CommandLine,

    #[serde(default)]
    pub reporter: Reporter,

    /// Quiet period before a watch rebuild starts.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Path components that never trigger a rebuild.
    #[serde(default = "default_watch_ignore")]
    pub watch_ignore: Vec<String>,
}

/// A program plus arguments.
///
/// Accepts either a list (`["node", "-"]`) or a whitespace separated string
/// (`"node -"`), so it can come from TOML and from a single env variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CommandRepr", into = "Vec<String>")]
pub struct CommandLine(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum CommandRepr {
    Line(String),
    Argv(Vec<String>),
}

impl From<CommandRepr> for CommandLine {
    fn from(repr: CommandRepr) -> Self {
        match repr {
            CommandRepr::Line(line) => Self(line.split_whitespace().map(str::to_string).collect()),
            CommandRepr::Argv(argv) => Self(argv),
        }
    }
}

impl From<CommandLine> for Vec<String> {
    fn from(command: CommandLine) -> Self {
        command.0
    }
}

impl CommandLine {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(argv.into_iter().map(Into::into).collect())
    }

    /// Program and arguments, `None` when the command is empty.
    pub fn split(&self) -> Option<(&str, &[String])> {
        self.0
            .split_first()
            .map(|(program, args)| (program.as_str(), args))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

fn default_bundler() -> CommandLine {
    CommandLine::new(["blueprints-bundle"])
}

fn default_test_runner() -> CommandLine {
    CommandLine::new(["node", "-"])
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_watch_ignore() -> Vec<String> {
    ["node_modules", "build", "dist", ".test", ".git"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            bundler: default_bundler(),
            test_runner: default_test_runner(),
            reporter: Reporter::default(),
            debounce_ms: default_debounce_ms(),
            watch_ignore: default_watch_ignore(),
        }
    }
}

impl RunnerSettings {
    /// Load settings for a project rooted at `cwd`.
    pub fn load(cwd: &Path) -> Result<Self> {
        Ok(Self::figment(cwd).extract()?)
    }

    fn figment(cwd: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let file = cwd.join(SETTINGS_FILE);
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults_without_file_or_env() {
        let dir = TempDir::new().unwrap();
        let settings = RunnerSettings::load(dir.path()).unwrap();
        assert_eq!(settings, RunnerSettings::default());
        assert_eq!(settings.test_runner.to_string(), "node -");
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "bundler = [\"esbuild-driver\", \"--json\"]\nreporter = \"dot\"\ndebounce_ms = 50\n",
        )
        .unwrap();

        let settings = RunnerSettings::load(dir.path()).unwrap();
        assert_eq!(settings.bundler, CommandLine::new(["esbuild-driver", "--json"]));
        assert_eq!(settings.reporter, Reporter::Dot);
        assert_eq!(settings.debounce_ms, 50);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "bundler = \"from-file\"\n").unwrap();

        unsafe { std::env::set_var("BLUEPRINTS_BUNDLER", "from-env --flag") };
        let settings = RunnerSettings::load(dir.path());
        unsafe { std::env::remove_var("BLUEPRINTS_BUNDLER") };

        let settings = settings.unwrap();
        assert_eq!(settings.bundler, CommandLine::new(["from-env", "--flag"]));
    }

    #[test]
    fn test_command_line_split() {
        let command = CommandLine::new(["node", "-"]);
        let (program, args) = command.split().unwrap();
        assert_eq!(program, "node");
        assert_eq!(args, ["-".to_string()]);
        assert!(CommandLine::new(Vec::<String>::new()).split().is_none());
    }
}
