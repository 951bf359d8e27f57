//! Error types for blueprint loading and build resolution.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Blueprint loading errors
    #[error("blueprint not found: {}", .0.display())]
    BlueprintNotFound(PathBuf),

    #[error("unsupported blueprint format: {0}")]
    UnsupportedFormat(String),

    #[error("blueprint evaluation failed in {}: {message}", .path.display())]
    Evaluation { path: PathBuf, message: String },

    #[error("invalid blueprint shape: {0}")]
    InvalidShape(String),

    // Build document errors
    #[error("invalid value for '{field}'{}", .hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    #[error("build '{0}' has no entries")]
    NoEntries(String),

    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, hint: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            hint: Some(hint.into()),
        }
    }

    /// Whether this error came out of loading a blueprint source.
    pub fn is_blueprint_error(&self) -> bool {
        matches!(
            self,
            ConfigError::BlueprintNotFound(_)
                | ConfigError::UnsupportedFormat(_)
                | ConfigError::Evaluation { .. }
                | ConfigError::InvalidShape(_)
                | ConfigError::Lua(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_renders_hint() {
        let err = ConfigError::invalid("bundle.entries", "expected an object or array");
        assert_eq!(
            err.to_string(),
            "invalid value for 'bundle.entries': expected an object or array"
        );
    }

    #[test]
    fn invalid_value_without_hint() {
        let err = ConfigError::InvalidValue {
            field: "name".into(),
            hint: None,
        };
        assert_eq!(err.to_string(), "invalid value for 'name'");
    }

    #[test]
    fn blueprint_errors_are_classified() {
        assert!(ConfigError::BlueprintNotFound(PathBuf::from("x.lua")).is_blueprint_error());
        assert!(ConfigError::InvalidShape("fn".into()).is_blueprint_error());
        assert!(!ConfigError::NoEntries("client".into()).is_blueprint_error());
    }
}
