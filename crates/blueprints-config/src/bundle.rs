//! Typed view over a normalized build document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Browser environment (default)
    #[default]
    Browser,
    /// Node.js
    Node,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Browser => "browser",
            Platform::Node => "node",
        }
    }
}

/// Output format for bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ECMAScript modules (default)
    #[default]
    Esm,
    /// CommonJS
    Cjs,
    /// Immediately invoked function expression
    Iife,
}

/// Optimization mode, derived from `production`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Production,
    #[default]
    Development,
}

impl Mode {
    pub fn for_production(is_production: bool) -> Self {
        if is_production {
            Mode::Production
        } else {
            Mode::Development
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Production => "production",
            Mode::Development => "development",
        }
    }
}

/// Source map generation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    Inline,
    External,
    Hidden,
}

/// `sourcemap` accepts a plain switch or an explicit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMapSetting {
    Enabled(bool),
    Mode(SourceMapMode),
}

impl SourceMapSetting {
    /// The effective mode, `None` when source maps are off.
    pub fn mode(&self) -> Option<SourceMapMode> {
        match self {
            SourceMapSetting::Enabled(true) => Some(SourceMapMode::External),
            SourceMapSetting::Enabled(false) => None,
            SourceMapSetting::Mode(mode) => Some(*mode),
        }
    }
}

/// Compiler settings of one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSpec {
    /// Entry name → source path
    pub entries: BTreeMap<String, String>,

    pub out_dir: PathBuf,

    /// Output file pattern; `[name]` is replaced by the entry name
    pub filename: String,

    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub minify: bool,

    pub sourcemap: SourceMapSetting,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,
}

impl BundleSpec {
    /// Output path of one entry, relative to the working directory.
    pub fn output_path(&self, entry: &str) -> PathBuf {
        self.out_dir.join(self.filename.replace("[name]", entry))
    }
}

/// A normalized build, as handed to a build engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    pub production: bool,

    pub watch: bool,

    pub bundle: BundleSpec,
}
