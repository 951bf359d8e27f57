//! Build engine seam.
//!
//! The supervisor hands the resolved set to a [`BuildEngine`] once and then
//! listens for completions. Outside watch mode an engine sends exactly one
//! [`BuildResult`]; in watch mode it sends one per rebuild and keeps the
//! channel open.

mod process;
mod watcher;

use crate::error::Result;
use async_trait::async_trait;
use blueprints_config::ResolvedConfigSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub use process::ProcessEngine;
pub use watcher::{FileChange, FileWatcher};

/// One error reported by the engine for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDiagnostic {
    /// Name of the build that failed
    pub build: String,
    pub message: String,
}

impl BuildDiagnostic {
    pub fn new(build: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            build: build.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one build pass over the whole set. Empty `errors` means success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    pub errors: Vec<BuildDiagnostic>,
    pub duration: Duration,
}

impl BuildResult {
    pub fn success(duration: Duration) -> Self {
        Self {
            errors: Vec::new(),
            duration,
        }
    }

    pub fn failed(errors: Vec<BuildDiagnostic>, duration: Duration) -> Self {
        Self { errors, duration }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// External build engine.
///
/// `invoke` is called once per process. The receiver yields one result per
/// completed pass; the engine never starts a pass before the previous result
/// was sent.
#[async_trait]
pub trait BuildEngine: Send + Sync {
    async fn invoke(&self, builds: Arc<ResolvedConfigSet>) -> Result<mpsc::Receiver<BuildResult>>;
}
