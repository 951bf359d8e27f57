//! Submits the resolved builds to the engine and reacts to completions.

use crate::engine::{BuildEngine, BuildResult};
use crate::error::{BuildError, Result};
use crate::testing::{TestEngine, TestLifecycle};
use crate::ui;
use blueprints_config::ResolvedConfigSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Message printed when a build fails outside watch mode.
pub const ABORT_MESSAGE: &str = "ERROR IN BUILD. Aborting.";

pub struct BuildSupervisor<E: BuildEngine, T: TestEngine> {
    engine: E,
    lifecycle: Option<TestLifecycle<T>>,
    watch: bool,
    completions: usize,
}

impl<E: BuildEngine, T: TestEngine> BuildSupervisor<E, T> {
    /// With `watch`, build errors are reported and tolerated.
    pub fn new(engine: E, watch: bool) -> Self {
        Self {
            engine,
            lifecycle: None,
            watch,
            completions: 0,
        }
    }

    /// Run tests after every completion.
    pub fn with_tests(mut self, lifecycle: TestLifecycle<T>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn lifecycle(&self) -> Option<&TestLifecycle<T>> {
        self.lifecycle.as_ref()
    }

    pub fn completions(&self) -> usize {
        self.completions
    }

    /// Submit `builds` once and handle completions until the engine stops.
    ///
    /// # Errors
    ///
    /// `BuildError::Aborted` when a pass reports errors outside watch mode,
    /// `BuildError::NoResult` when the engine stops without any completion.
    pub async fn run(&mut self, builds: ResolvedConfigSet) -> Result<()> {
        info!("Submitting {} build(s)", builds.len());
        let mut results = self.engine.invoke(Arc::new(builds)).await?;

        while let Some(result) = results.recv().await {
            self.completions += 1;
            self.on_complete(result).await?;
        }

        if self.completions == 0 {
            return Err(BuildError::NoResult.into());
        }
        Ok(())
    }

    async fn on_complete(&mut self, result: BuildResult) -> Result<()> {
        if result.has_errors() {
            ui::error(&ui::format_build_errors(&result.errors));
            if !self.watch {
                ui::error(ABORT_MESSAGE);
                return Err(BuildError::Aborted {
                    count: result.errors.len(),
                }
                .into());
            }
            warn!(
                "Build finished with {} error(s); waiting for changes",
                result.errors.len()
            );
        } else {
            ui::success(&format!(
                "Build finished in {}",
                ui::format_duration(result.duration)
            ));
        }

        if let Some(lifecycle) = self.lifecycle.as_mut() {
            lifecycle.on_build_complete().await?;
        }
        Ok(())
    }

    /// Shut down the test lifecycle, if any. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(lifecycle) = self.lifecycle.as_mut() {
            lifecycle.shutdown();
        }
    }
}
