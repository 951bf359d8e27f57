//! Lua blueprint evaluation.
//!
//! The blueprint chunk runs in a fresh Lua state whose `package.path` points
//! at the blueprint's directory, so shared settings can live in sibling
//! modules and be pulled in with `require`. Whatever the chunk returns is the
//! exported value.

use std::path::{Path, PathBuf};

use mlua::{DeserializeOptions, Lua, LuaSerdeExt, SerializeOptions, Value as LuaValue};

use crate::blueprint::{BlueprintFn, RawBlueprint};
use crate::error::{ConfigError, Result};

/// Evaluate a Lua blueprint file and return its exported value.
pub fn load_lua_blueprint(path: &Path) -> Result<RawBlueprint> {
    tracing::debug!("evaluating Lua blueprint {}", path.display());

    let source = std::fs::read_to_string(path)?;
    let config_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let lua = Lua::new();
    setup_package_path(&lua, &config_dir)?;
    register_blueprints_table(&lua)?;

    let exported: LuaValue = lua
        .load(source.as_str())
        .set_name(format!("@{}", path.display()))
        .eval()
        .map_err(|err| evaluation_error(path, err))?;

    into_raw(&lua, exported, path)
}

/// Evaluate Lua source held in memory. `name` is used in error messages.
pub fn load_lua_blueprint_str(source: &str, name: &str) -> Result<RawBlueprint> {
    let path = PathBuf::from(name);
    let lua = Lua::new();
    register_blueprints_table(&lua)?;

    let exported: LuaValue = lua
        .load(source)
        .set_name(name)
        .eval()
        .map_err(|err| evaluation_error(&path, err))?;

    into_raw(&lua, exported, &path)
}

fn into_raw(lua: &Lua, value: LuaValue, path: &Path) -> Result<RawBlueprint> {
    match value {
        LuaValue::Function(func) => {
            // The closure owns a handle to the state so the function outlives this call.
            let lua = lua.clone();
            let path = path.to_path_buf();
            Ok(RawBlueprint::Function(BlueprintFn::new(move |options| {
                let args = lua.to_value_with(
                    options,
                    SerializeOptions::new().serialize_none_to_null(false),
                )?;
                let produced: LuaValue = func
                    .call(args)
                    .map_err(|err| evaluation_error(&path, err))?;
                into_raw(&lua, produced, &path)
            })))
        }
        other => {
            let document: serde_json::Value = lua
                .from_value_with(other, DeserializeOptions::new())
                .map_err(|err| evaluation_error(path, err))?;
            Ok(RawBlueprint::Document(document))
        }
    }
}

fn setup_package_path(lua: &Lua, dir: &Path) -> mlua::Result<()> {
    let package: mlua::Table = lua.globals().get("package")?;
    let current: String = package.get("path")?;
    let dir = dir.display();
    package.set("path", format!("{dir}/?.lua;{dir}/?/init.lua;{current}"))?;
    Ok(())
}

/// Expose a small `blueprints` global with host information.
fn register_blueprints_table(lua: &Lua) -> mlua::Result<()> {
    let table = lua.create_table()?;
    table.set("version", env!("CARGO_PKG_VERSION"))?;
    table.set("os", std::env::consts::OS)?;
    if let Ok(cwd) = std::env::current_dir() {
        table.set("cwd", cwd.display().to_string())?;
    }
    lua.globals().set("blueprints", table)?;
    Ok(())
}

fn evaluation_error(path: &Path, err: mlua::Error) -> ConfigError {
    ConfigError::Evaluation {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Blueprint, BlueprintOutput};
    use crate::options::{Env, InvocationOptions, Target};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn document(source: &str) -> serde_json::Value {
        match load_lua_blueprint_str(source, "inline.lua").unwrap() {
            RawBlueprint::Document(value) => value,
            RawBlueprint::Function(_) => panic!("expected a document"),
        }
    }

    #[test]
    fn returns_table_as_document() {
        let value = document(r#"return { name = "app", bundle = { minify = true } }"#);
        assert_eq!(value, json!({ "name": "app", "bundle": { "minify": true } }));
    }

    #[test]
    fn sequences_become_arrays() {
        let value = document(r#"return { { name = "a" }, { name = "b" } }"#);
        assert_eq!(value, json!([{ "name": "a" }, { "name": "b" }]));
    }

    #[test]
    fn nil_becomes_null() {
        assert_eq!(document("return nil"), serde_json::Value::Null);
    }

    #[test]
    fn functions_receive_invocation_options() {
        let raw = load_lua_blueprint_str(
            r#"
            return function(options)
              return {
                name = options.target .. "-" .. options.env,
                watch = options.watch,
                hasPath = options.blueprintsPath ~= nil,
              }
            end
            "#,
            "inline.lua",
        )
        .unwrap();

        let options = InvocationOptions {
            blueprints_path: None,
            env: Env::Production,
            target: Some(Target::Server),
            ..Default::default()
        };
        let output = Blueprint::classify(raw).unwrap().evaluate(&options).unwrap();
        let BlueprintOutput::Builds(builds) = output else {
            panic!("expected builds");
        };
        assert_eq!(
            builds[0].as_value(),
            &json!({ "name": "server-production", "watch": false, "hasPath": false })
        );
    }

    #[test]
    fn syntax_errors_are_evaluation_errors() {
        let err = load_lua_blueprint_str("return {", "broken.lua").unwrap_err();
        assert!(matches!(err, ConfigError::Evaluation { .. }));
    }

    #[test]
    fn runtime_errors_are_evaluation_errors() {
        let err = load_lua_blueprint_str(r#"error("boom")"#, "boom.lua").unwrap_err();
        let ConfigError::Evaluation { message, .. } = err else {
            panic!("expected an evaluation error");
        };
        assert!(message.contains("boom"));
    }

    #[test]
    fn require_resolves_sibling_modules() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("shared.lua"),
            r#"return { outDir = "./out" }"#,
        )
        .unwrap();
        let path = dir.path().join("blueprints.config.lua");
        fs::write(
            &path,
            r#"
            local shared = require("shared")
            return { extensions = true, bundle = { outDir = shared.outDir } }
            "#,
        )
        .unwrap();

        let RawBlueprint::Document(value) = load_lua_blueprint(&path).unwrap() else {
            panic!("expected a document");
        };
        assert_eq!(
            value,
            json!({ "extensions": true, "bundle": { "outDir": "./out" } })
        );
    }
}
