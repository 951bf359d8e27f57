//! Build configuration documents and deep merging.
//!
//! A [`BuildConfig`] is a semi-structured JSON document describing one build
//! unit. Documents are combined with [`merge_values`]: nested objects merge
//! key by key, while arrays and scalars from the later source replace the
//! earlier value wholesale.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Marker field that turns a blueprint object into an extensions document.
pub const EXTENSIONS_MARKER: &str = "extensions";

/// One build unit, kept as an opaque mergeable document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildConfig(Value);

impl BuildConfig {
    /// Wrap a JSON value. Shape is validated later, during normalization.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a nested value by a dotted path such as `bundle.outDir`.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.0, |value, segment| value.get(segment))
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn watch(&self) -> bool {
        self.get("watch").is_some_and(is_truthy)
    }

    /// Returns a new document with `overrides` deep-merged on top.
    pub fn merged_with(&self, overrides: &Value) -> BuildConfig {
        let mut base = self.0.clone();
        merge_values(&mut base, overrides);
        BuildConfig(base)
    }
}

impl From<Value> for BuildConfig {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Partial build document merged onto every resolved build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(Map<String, Value>);

impl Extensions {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build extensions from a marked blueprint object, dropping the marker.
    pub fn from_marked(mut fields: Map<String, Value>) -> Self {
        fields.remove(EXTENSIONS_MARKER);
        Self(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Returns a copy with `watch: true` forced in.
    pub fn with_watch(&self) -> Extensions {
        let mut fields = self.0.clone();
        fields.insert("watch".to_string(), Value::Bool(true));
        Extensions(fields)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Merge these extensions over `build`; extension values win on conflict.
    pub fn apply_to(&self, build: &BuildConfig) -> BuildConfig {
        if self.is_empty() {
            return build.clone();
        }
        build.merged_with(&self.to_value())
    }
}

impl TryFrom<Value> for Extensions {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Extensions::from_marked(fields)),
            Value::Null => Ok(Extensions::default()),
            other => Err(ConfigError::invalid(
                EXTENSIONS_MARKER,
                format!("extensions must be an object, got {}", kind_of(&other)),
            )),
        }
    }
}

/// Deep merge `update` into `target`.
///
/// Objects merge recursively; every other value in `update` replaces the
/// corresponding slot in `target`.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

/// JavaScript-style truthiness, used for marker fields written by hand.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_recurses_into_objects() {
        let mut base = json!({ "bundle": { "minify": false, "outDir": "./build" } });
        merge_values(&mut base, &json!({ "bundle": { "minify": true } }));
        assert_eq!(base, json!({ "bundle": { "minify": true, "outDir": "./build" } }));
    }

    #[test]
    fn merge_replaces_arrays_wholesale() {
        let mut base = json!({ "external": ["react", "react-dom"] });
        merge_values(&mut base, &json!({ "external": ["vue"] }));
        assert_eq!(base, json!({ "external": ["vue"] }));
    }

    #[test]
    fn merge_replaces_scalar_with_object() {
        let mut base = json!({ "sourcemap": true });
        merge_values(&mut base, &json!({ "sourcemap": { "mode": "hidden" } }));
        assert_eq!(base, json!({ "sourcemap": { "mode": "hidden" } }));
    }

    #[test]
    fn merged_with_leaves_original_untouched() {
        let build = BuildConfig::from_value(json!({ "watch": false }));
        let merged = build.merged_with(&json!({ "watch": true }));
        assert!(!build.watch());
        assert!(merged.watch());
    }

    #[test]
    fn with_watch_does_not_mutate_source() {
        let extensions = Extensions::new(Map::new());
        let watched = extensions.with_watch();
        assert!(extensions.is_empty());
        assert_eq!(watched.get("watch"), Some(&json!(true)));
    }

    #[test]
    fn from_marked_strips_marker() {
        let Value::Object(fields) = json!({ "extensions": true, "watch": true }) else {
            unreachable!()
        };
        let extensions = Extensions::from_marked(fields);
        assert_eq!(extensions.to_value(), json!({ "watch": true }));
    }

    #[test]
    fn apply_to_prefers_extension_values() {
        let build = BuildConfig::from_value(json!({
            "name": "client",
            "bundle": { "minify": false, "platform": "browser" }
        }));
        let Value::Object(fields) = json!({ "bundle": { "minify": true } }) else {
            unreachable!()
        };
        let merged = Extensions::new(fields).apply_to(&build);
        assert_eq!(merged.pointer("bundle.minify"), Some(&json!(true)));
        assert_eq!(merged.pointer("bundle.platform"), Some(&json!("browser")));
        assert_eq!(merged.name(), Some("client"));
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn extensions_reject_non_objects() {
        assert!(Extensions::try_from(json!([1, 2])).is_err());
        assert!(Extensions::try_from(Value::Null).unwrap().is_empty());
    }
}
