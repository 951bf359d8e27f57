//! Build resolution: blueprint + defaults + CLI flags → one ordered build list.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::blueprint::{BlueprintLoader, BlueprintOutput};
use crate::config::{BuildConfig, Extensions};
use crate::defaults::TargetDefaults;
use crate::error::Result;
use crate::normalize::normalize_build;
use crate::options::InvocationOptions;

/// The final, normalized build list. Built once and never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedConfigSet {
    builds: Vec<BuildConfig>,
}

impl ResolvedConfigSet {
    pub fn builds(&self) -> &[BuildConfig] {
        &self.builds
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildConfig> {
        self.builds.iter()
    }

    /// Whether any build asks the engine to keep watching.
    pub fn watch_enabled(&self) -> bool {
        self.builds.iter().any(BuildConfig::watch)
    }

    pub fn into_builds(self) -> Vec<BuildConfig> {
        self.builds
    }
}

impl<'a> IntoIterator for &'a ResolvedConfigSet {
    type Item = &'a BuildConfig;
    type IntoIter = std::slice::Iter<'a, BuildConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.builds.iter()
    }
}

/// Combines blueprints, target defaults and CLI flags.
///
/// # Example
///
/// ```no_run
/// use blueprints_config::{ConfigResolver, InvocationOptions};
///
/// let options = InvocationOptions {
///     ignore_blueprints: true,
///     ..Default::default()
/// };
/// let resolved = ConfigResolver::new(".").resolve(&options).unwrap();
/// assert_eq!(resolved.len(), 2);
/// ```
pub struct ConfigResolver {
    root: PathBuf,
    defaults: TargetDefaults,
}

impl ConfigResolver {
    /// `root` is the working directory blueprint paths are resolved against.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            defaults: TargetDefaults::new(&root),
            root,
        }
    }

    /// Resolve the builds for one invocation.
    ///
    /// Precedence, highest first: the CLI watch flag, blueprint extensions,
    /// explicit blueprint builds, target defaults.
    ///
    /// # Errors
    ///
    /// Blueprint loading failures and builds that fail normalization.
    pub fn resolve(&self, options: &InvocationOptions) -> Result<ResolvedConfigSet> {
        let mut extensions = Extensions::default();
        let mut builds: Option<Vec<BuildConfig>> = None;

        if let Some(path) = self.blueprint_path(options) {
            tracing::debug!("loading blueprints from {}", path.display());
            match BlueprintLoader::load(&path, options)? {
                BlueprintOutput::Extensions(loaded) => {
                    tracing::debug!("blueprint provides extensions: {:?}", loaded.keys().collect::<Vec<_>>());
                    extensions = loaded;
                }
                BlueprintOutput::Builds(list) if !list.is_empty() => {
                    tracing::debug!("blueprint provides {} builds", list.len());
                    builds = Some(list);
                }
                BlueprintOutput::Builds(_) | BlueprintOutput::Empty => {
                    tracing::debug!("blueprint provides no builds");
                }
            }
        }

        let builds = match builds {
            Some(builds) => builds,
            None => self
                .defaults
                .for_target(options.target, options.is_production()),
        };

        let extensions = if options.watch {
            extensions.with_watch()
        } else {
            extensions
        };

        let builds = builds
            .iter()
            .enumerate()
            .map(|(index, build)| normalize_build(extensions.apply_to(build), index))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("resolved {} builds", builds.len());
        Ok(ResolvedConfigSet { builds })
    }

    fn blueprint_path(&self, options: &InvocationOptions) -> Option<PathBuf> {
        if options.ignore_blueprints {
            return None;
        }
        options
            .blueprints_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
            .map(|path| self.root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::options::{Env, Target};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn options_with(path: &str) -> InvocationOptions {
        InvocationOptions {
            blueprints_path: Some(PathBuf::from(path)),
            ..Default::default()
        }
    }

    #[test]
    fn ignore_blueprints_skips_loading() {
        let dir = TempDir::new().unwrap();
        // A broken blueprint would fail resolution if it were read.
        fs::write(dir.path().join("blueprints.config.lua"), "return {").unwrap();

        let options = InvocationOptions {
            ignore_blueprints: true,
            ..Default::default()
        };
        let resolved = ConfigResolver::new(dir.path()).resolve(&options).unwrap();
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn missing_path_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let options = InvocationOptions {
            blueprints_path: None,
            target: Some(Target::Server),
            ..Default::default()
        };
        let resolved = ConfigResolver::new(dir.path()).resolve(&options).unwrap();
        assert_eq!(resolved.builds()[0].name(), Some("server"));
    }

    #[test]
    fn missing_blueprint_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigResolver::new(dir.path())
            .resolve(&options_with("./nope.lua"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::BlueprintNotFound(_)));
    }

    #[test]
    fn empty_build_list_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), "[]").unwrap();
        let resolved = ConfigResolver::new(dir.path())
            .resolve(&options_with("b.json"))
            .unwrap();
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn watch_flag_creates_extensions() {
        let dir = TempDir::new().unwrap();
        let options = InvocationOptions {
            ignore_blueprints: true,
            watch: true,
            env: Env::Production,
            ..Default::default()
        };
        let resolved = ConfigResolver::new(dir.path()).resolve(&options).unwrap();
        assert!(resolved.watch_enabled());
        for build in &resolved {
            assert_eq!(build.get("watch"), Some(&json!(true)));
            assert_eq!(build.get("production"), Some(&json!(true)));
        }
    }
}
