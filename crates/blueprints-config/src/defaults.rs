//! Built-in build configurations keyed by target and environment.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::config::BuildConfig;
use crate::discovery::TestDiscovery;
use crate::options::Target;

/// Transient directory holding compiled test artifacts.
pub const TEST_OUTPUT_DIR: &str = "./.test";

/// Extension given to every compiled test artifact.
pub const COMPILED_TEST_EXTENSION: &str = "compiledtest";

/// Client bundle: browser platform, minified in production.
pub fn client_config(is_production: bool) -> BuildConfig {
    BuildConfig::from_value(json!({
        "name": "client",
        "target": "client",
        "production": is_production,
        "watch": false,
        "bundle": {
            "entries": { "main": "./src/client.js" },
            "outDir": "./build/public",
            "filename": "[name].js",
            "platform": "browser",
            "format": "iife",
            "minify": is_production,
            "sourcemap": !is_production,
        }
    }))
}

/// Server bundle: node platform, never minified.
pub fn server_config(is_production: bool) -> BuildConfig {
    BuildConfig::from_value(json!({
        "name": "server",
        "target": "server",
        "production": is_production,
        "watch": false,
        "bundle": {
            "entries": { "server": "./src/server.js" },
            "outDir": "./build",
            "filename": "[name].js",
            "platform": "node",
            "format": "cjs",
            "minify": false,
            "sourcemap": !is_production,
        }
    }))
}

/// Test bundle skeleton; entries are filled in from discovery.
pub fn testing_config() -> BuildConfig {
    BuildConfig::from_value(json!({
        "name": "test",
        "target": "test",
        "production": false,
        "watch": false,
        "bundle": {
            "entries": {},
            "outDir": TEST_OUTPUT_DIR,
            "filename": format!("[name].{COMPILED_TEST_EXTENSION}"),
            "platform": "node",
            "format": "cjs",
            "minify": false,
            "sourcemap": "inline",
        }
    }))
}

/// Default build lists for a target.
pub struct TargetDefaults {
    root: PathBuf,
}

impl TargetDefaults {
    /// `root` is the working tree scanned for test sources.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Baseline builds for `target`. No target means client then server.
    pub fn for_target(&self, target: Option<Target>, is_production: bool) -> Vec<BuildConfig> {
        tracing::debug!("using default configs");
        match target {
            Some(Target::Test) => {
                tracing::debug!("setting up tests");
                let entries = TestDiscovery::new(&self.root).entries();
                vec![testing_config().merged_with(&json!({ "bundle": { "entries": entries } }))]
            }
            Some(Target::Client) => {
                tracing::debug!("default target: client");
                vec![client_config(is_production)]
            }
            Some(Target::Server) => {
                tracing::debug!("default target: server");
                vec![server_config(is_production)]
            }
            None => {
                tracing::debug!("default target: client and server");
                vec![client_config(is_production), server_config(is_production)]
            }
        }
    }
}
