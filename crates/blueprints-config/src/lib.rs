//! Build configuration resolution for blueprints.
//!
//! Turns an invocation (CLI flags), an optional user blueprint and the
//! built-in target defaults into one ordered list of normalized builds.
//!
//! ```no_run
//! use blueprints_config::{ConfigResolver, InvocationOptions, Target};
//!
//! let options = InvocationOptions {
//!     target: Some(Target::Client),
//!     ..Default::default()
//! };
//! let resolved = ConfigResolver::new(".").resolve(&options)?;
//! for build in &resolved {
//!     println!("{}", build.name().unwrap_or("unnamed"));
//! }
//! # Ok::<(), blueprints_config::ConfigError>(())
//! ```

pub mod blueprint;
pub mod bundle;
pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod eval;
pub mod normalize;
pub mod options;
pub mod resolver;

// Re-export main types
pub use blueprint::{Blueprint, BlueprintFn, BlueprintLoader, BlueprintOutput, RawBlueprint};
pub use bundle::*;
pub use config::{BuildConfig, Extensions, is_truthy, merge_values};
pub use defaults::{
    COMPILED_TEST_EXTENSION, TEST_OUTPUT_DIR, TargetDefaults, client_config, server_config,
    testing_config,
};
pub use discovery::{EntryMap, TestDiscovery};
pub use error::*;
pub use normalize::normalize_build;
pub use options::{DEFAULT_BLUEPRINTS_PATH, Env, InvocationOptions, Target};
pub use resolver::{ConfigResolver, ResolvedConfigSet};
