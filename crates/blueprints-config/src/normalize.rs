//! Build normalization.
//!
//! Every resolved build passes through [`normalize_build`] exactly once. It
//! fills in derived fields, checks the shape against [`BuildSpec`], and keeps
//! unknown keys so engines can read their own extras.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::bundle::{BuildSpec, Mode};
use crate::config::{BuildConfig, is_truthy, kind_of};
use crate::error::{ConfigError, Result};

const DEFAULT_OUT_DIR: &str = "./build";
const DEFAULT_FILENAME: &str = "[name].js";

/// Normalize the build at position `index` of the resolved list.
pub fn normalize_build(build: BuildConfig, index: usize) -> Result<BuildConfig> {
    let Value::Object(mut fields) = build.into_value() else {
        return Err(ConfigError::invalid(
            format!("builds[{index}]"),
            "each build must be an object",
        ));
    };

    let production = fields.get("production").is_some_and(is_truthy);
    let watch = fields.get("watch").is_some_and(is_truthy);
    fields.insert("production".into(), Value::Bool(production));
    fields.insert("watch".into(), Value::Bool(watch));

    let name = match fields.get("name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => fields
            .get("target")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("build-{index}")),
    };
    fields.insert("name".into(), Value::String(name.clone()));

    let mut bundle = match fields.remove("bundle") {
        Some(Value::Object(bundle)) => bundle,
        None | Some(Value::Null) => return Err(ConfigError::NoEntries(name)),
        Some(other) => {
            return Err(ConfigError::invalid(
                format!("{name}.bundle"),
                format!("expected an object, got {}", kind_of(&other)),
            ));
        }
    };

    let entries = normalize_entries(&name, bundle.remove("entries"))?;
    if entries.is_empty() {
        tracing::warn!("build '{name}' has an empty entry mapping");
    }
    bundle.insert("entries".into(), Value::Object(entries));

    fill(&mut bundle, "outDir", || Value::from(DEFAULT_OUT_DIR));
    fill(&mut bundle, "filename", || Value::from(DEFAULT_FILENAME));
    fill(&mut bundle, "platform", || Value::from("browser"));
    fill(&mut bundle, "format", || Value::from("esm"));
    fill(&mut bundle, "minify", || Value::Bool(production));
    fill(&mut bundle, "sourcemap", || Value::Bool(!production));
    fill(&mut bundle, "mode", || {
        Value::from(Mode::for_production(production).as_str())
    });

    fields.insert("bundle".into(), Value::Object(bundle));
    let normalized = Value::Object(fields);

    // Shape check only; the document itself is what gets returned.
    serde_json::from_value::<BuildSpec>(normalized.clone())
        .map_err(|err| ConfigError::invalid(name.as_str(), err.to_string()))?;

    Ok(BuildConfig::from_value(normalized))
}

impl BuildConfig {
    /// Typed view of a normalized build.
    pub fn spec(&self) -> Result<BuildSpec> {
        serde_json::from_value(self.as_value().clone()).map_err(|err| {
            ConfigError::invalid(self.name().unwrap_or("build"), err.to_string())
        })
    }
}

fn fill(bundle: &mut Map<String, Value>, key: &str, default: impl FnOnce() -> Value) {
    match bundle.get(key) {
        Some(value) if !value.is_null() => {}
        _ => {
            bundle.insert(key.to_string(), default());
        }
    }
}

/// Accept a mapping, a list of paths, or a single path.
fn normalize_entries(name: &str, entries: Option<Value>) -> Result<Map<String, Value>> {
    let field = format!("{name}.bundle.entries");
    match entries {
        None | Some(Value::Null) => Err(ConfigError::NoEntries(name.to_string())),
        Some(Value::Object(map)) => {
            if let Some((key, value)) = map.iter().find(|(_, v)| !v.is_string()) {
                return Err(ConfigError::invalid(
                    field,
                    format!("entry '{key}' must be a path, got {}", kind_of(value)),
                ));
            }
            Ok(map)
        }
        Some(Value::String(path)) => entries_from_paths(&field, vec![path]),
        Some(Value::Array(items)) => {
            let paths = items
                .into_iter()
                .map(|item| match item {
                    Value::String(path) => Ok(path),
                    other => Err(ConfigError::invalid(
                        field.as_str(),
                        format!("entries must be paths, got {}", kind_of(&other)),
                    )),
                })
                .collect::<Result<Vec<_>>>()?;
            entries_from_paths(&field, paths)
        }
        Some(other) => Err(ConfigError::invalid(
            field,
            format!("expected a mapping or a list, got {}", kind_of(&other)),
        )),
    }
}

/// Name list entries after their file stem.
fn entries_from_paths(field: &str, paths: Vec<String>) -> Result<Map<String, Value>> {
    let mut named = BTreeMap::new();
    for path in paths {
        let stem = Path::new(&path)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::invalid(field, format!("'{path}' has no file name")))?
            .to_string();
        if named.insert(stem.clone(), Value::String(path)).is_some() {
            return Err(ConfigError::invalid(
                field,
                format!("two entries would both be named '{stem}'; use a mapping instead"),
            ));
        }
    }
    Ok(named.into_iter().collect())
}
