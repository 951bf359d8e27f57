//! Blueprint loading and classification.
//!
//! A blueprint is a user-authored source that either replaces the default
//! builds, or extends every build with overrides. Sources are read by file
//! extension:
//!
//! - `.lua` - evaluated; the chunk's return value is the blueprint
//! - `.json` / `.toml` - static documents
//!
//! The loaded value is classified into a closed [`Blueprint`] variant before
//! anything else looks at it:
//!
//! ```lua
//! -- blueprints.config.lua
//! return function(options)
//!   return {
//!     { name = "app", bundle = { entries = { main = "./src/app.js" } } },
//!   }
//! end
//! ```

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::config::{BuildConfig, EXTENSIONS_MARKER, Extensions, is_truthy, kind_of};
use crate::error::{ConfigError, Result};
use crate::eval;
use crate::options::InvocationOptions;

/// A blueprint function, invoked once with the current invocation options.
pub struct BlueprintFn(Box<dyn FnOnce(&InvocationOptions) -> Result<RawBlueprint>>);

impl BlueprintFn {
    pub fn new(f: impl FnOnce(&InvocationOptions) -> Result<RawBlueprint> + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn call(self, options: &InvocationOptions) -> Result<RawBlueprint> {
        (self.0)(options)
    }
}

impl fmt::Debug for BlueprintFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlueprintFn(..)")
    }
}

/// A value exported by a blueprint source, before classification.
#[derive(Debug)]
pub enum RawBlueprint {
    Function(BlueprintFn),
    Document(Value),
}

/// A classified blueprint.
#[derive(Debug)]
pub enum Blueprint {
    /// Computes the real blueprint from the invocation options.
    Builder(BlueprintFn),
    /// Explicit builds; replaces the defaults entirely.
    BuildList(Vec<BuildConfig>),
    /// Overrides merged onto every build, defaults included.
    ExtensionDoc(Extensions),
}

/// What a blueprint contributes to resolution. Never both builds and extensions.
#[derive(Debug, Clone, PartialEq)]
pub enum BlueprintOutput {
    Extensions(Extensions),
    Builds(Vec<BuildConfig>),
    Empty,
}

impl Blueprint {
    /// Classify a raw value. `None` means there is nothing usable to classify.
    pub fn classify(raw: RawBlueprint) -> Option<Blueprint> {
        match raw {
            RawBlueprint::Function(f) => Some(Blueprint::Builder(f)),
            RawBlueprint::Document(Value::Array(items)) => Some(Blueprint::BuildList(
                items.into_iter().map(BuildConfig::from_value).collect(),
            )),
            RawBlueprint::Document(Value::Object(fields)) => {
                if fields.get(EXTENSIONS_MARKER).is_some_and(is_truthy) {
                    Some(Blueprint::ExtensionDoc(Extensions::from_marked(fields)))
                } else {
                    Some(Blueprint::BuildList(vec![BuildConfig::from_value(
                        Value::Object(fields),
                    )]))
                }
            }
            RawBlueprint::Document(Value::Null) => None,
            RawBlueprint::Document(other) => {
                tracing::warn!(
                    "blueprint exported {}, expected a function, an array or an object; ignoring it",
                    kind_of(&other)
                );
                None
            }
        }
    }

    /// Reduce the blueprint to its contribution, invoking a builder if needed.
    pub fn evaluate(self, options: &InvocationOptions) -> Result<BlueprintOutput> {
        match self {
            Blueprint::Builder(f) => match Blueprint::classify(f.call(options)?) {
                Some(Blueprint::Builder(_)) => Err(ConfigError::InvalidShape(
                    "blueprint function returned another function".to_string(),
                )),
                Some(inner) => inner.evaluate(options),
                None => Ok(BlueprintOutput::Empty),
            },
            Blueprint::BuildList(builds) => Ok(BlueprintOutput::Builds(builds)),
            Blueprint::ExtensionDoc(extensions) => Ok(BlueprintOutput::Extensions(extensions)),
        }
    }
}

/// Loads blueprint sources from disk.
pub struct BlueprintLoader;

impl BlueprintLoader {
    /// Load, classify and evaluate the blueprint at `path`.
    ///
    /// # Errors
    ///
    /// Any failure to find, read, or evaluate the source, and a builder that
    /// returns another builder.
    pub fn load(path: &Path, options: &InvocationOptions) -> Result<BlueprintOutput> {
        let raw = Self::read(path)?;
        match Blueprint::classify(raw) {
            Some(blueprint) => blueprint.evaluate(options),
            None => Ok(BlueprintOutput::Empty),
        }
    }

    /// Read the exported value of a blueprint source without classifying it.
    pub fn read(path: &Path) -> Result<RawBlueprint> {
        if !path.is_file() {
            return Err(ConfigError::BlueprintNotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        match extension {
            "lua" => eval::load_lua_blueprint(path),
            "json" => {
                let content = std::fs::read_to_string(path)?;
                let value = serde_json::from_str(&content).map_err(|e| {
                    ConfigError::Evaluation {
                        path: path.to_path_buf(),
                        message: format!("invalid JSON: {e}"),
                    }
                })?;
                Ok(RawBlueprint::Document(value))
            }
            "toml" => {
                let content = std::fs::read_to_string(path)?;
                let table: toml::Table =
                    toml::from_str(&content).map_err(|e| ConfigError::Evaluation {
                        path: path.to_path_buf(),
                        message: format!("invalid TOML: {e}"),
                    })?;
                let value = serde_json::to_value(table).map_err(|e| {
                    ConfigError::Evaluation {
                        path: path.to_path_buf(),
                        message: format!("TOML to JSON conversion failed: {e}"),
                    }
                })?;
                Ok(RawBlueprint::Document(value))
            }
            other => Err(ConfigError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                format!(".{other} ({})", path.display())
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> RawBlueprint {
        RawBlueprint::Document(value)
    }

    #[test]
    fn arrays_classify_as_build_lists() {
        let classified = Blueprint::classify(doc(json!([{ "name": "a" }, { "name": "b" }])));
        let Some(Blueprint::BuildList(builds)) = classified else {
            panic!("expected a build list");
        };
        assert_eq!(builds.len(), 2);
    }

    #[test]
    fn plain_objects_become_single_builds() {
        let classified = Blueprint::classify(doc(json!({ "name": "solo" })));
        let Some(Blueprint::BuildList(builds)) = classified else {
            panic!("expected a build list");
        };
        assert_eq!(builds[0].name(), Some("solo"));
    }

    #[test]
    fn marked_objects_become_extensions() {
        let classified = Blueprint::classify(doc(json!({ "extensions": true, "watch": true })));
        let Some(Blueprint::ExtensionDoc(extensions)) = classified else {
            panic!("expected an extensions document");
        };
        assert_eq!(extensions.to_value(), json!({ "watch": true }));
    }

    #[test]
    fn falsy_marker_keeps_object_as_build() {
        let classified = Blueprint::classify(doc(json!({ "extensions": false, "name": "x" })));
        assert!(matches!(classified, Some(Blueprint::BuildList(_))));
    }

    #[test]
    fn null_and_scalars_are_unclassifiable() {
        assert!(Blueprint::classify(doc(Value::Null)).is_none());
        assert!(Blueprint::classify(doc(json!(42))).is_none());
    }

    #[test]
    fn builder_receives_options() {
        let builder = Blueprint::Builder(BlueprintFn::new(|options| {
            Ok(RawBlueprint::Document(json!({ "name": options.env.as_str() })))
        }));
        let output = builder.evaluate(&InvocationOptions::default()).unwrap();
        let BlueprintOutput::Builds(builds) = output else {
            panic!("expected builds");
        };
        assert_eq!(builds[0].name(), Some("dev"));
    }

    #[test]
    fn builder_returning_builder_is_rejected() {
        let builder = Blueprint::Builder(BlueprintFn::new(|_| {
            Ok(RawBlueprint::Function(BlueprintFn::new(|_| {
                Ok(RawBlueprint::Document(json!([])))
            })))
        }));
        let err = builder.evaluate(&InvocationOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidShape(_)));
    }

    #[test]
    fn builder_returning_null_is_empty() {
        let builder =
            Blueprint::Builder(BlueprintFn::new(|_| Ok(RawBlueprint::Document(Value::Null))));
        assert_eq!(
            builder.evaluate(&InvocationOptions::default()).unwrap(),
            BlueprintOutput::Empty
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = BlueprintLoader::read(Path::new("/definitely/missing/blueprints.lua"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::BlueprintNotFound(_)));
    }
}
