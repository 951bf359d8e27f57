//! Test rerun loop driven by build completions.
//!
//! ```text
//! Idle -> Discovering -> Running -> Idle        (one cycle per build completion)
//! any  -> CleaningUp -> Terminated              (shutdown)
//! ```

use super::engine::{TestEngine, TestSummary};
use super::workspace::TransientWorkspace;
use crate::error::Result;
use crate::ui;
use blueprints_config::COMPILED_TEST_EXTENSION;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Discovering,
    Running,
    CleaningUp,
    Terminated,
}

/// Compiled test artifacts found under the output directory.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    /// Entries that could not be read; they are skipped.
    pub errors: usize,
}

/// Recursively collect `*.compiledtest` files under `dir`, sorted by path.
///
/// A missing directory yields no files. Unreadable entries are logged and
/// counted, the rest of the tree is still scanned.
pub fn discover_artifacts(dir: &Path) -> Discovered {
    let mut discovered = Discovered::default();
    if !dir.exists() {
        debug!("No test output at {}", dir.display());
        return discovered;
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                let is_artifact = entry.file_type().is_file()
                    && entry.path().extension().and_then(|e| e.to_str())
                        == Some(COMPILED_TEST_EXTENSION);
                if is_artifact {
                    discovered.files.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!("Skipping unreadable test output: {}", err);
                discovered.errors += 1;
            }
        }
    }

    discovered
}

pub struct TestLifecycle<T: TestEngine> {
    engine: T,
    workspace: Arc<TransientWorkspace>,
    state: LifecycleState,
    runs: usize,
}

impl<T: TestEngine> TestLifecycle<T> {
    /// Tests are discovered under the workspace directory.
    pub fn new(engine: T, workspace: Arc<TransientWorkspace>) -> Self {
        Self {
            engine,
            workspace,
            state: LifecycleState::Idle,
            runs: 0,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn engine(&self) -> &T {
        &self.engine
    }

    /// Completed discover-and-run cycles.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Run one cycle after a build completion.
    ///
    /// Returns `None` once the lifecycle has shut down. Cached artifact
    /// content is forgotten after every run, whether or not it succeeded.
    pub async fn on_build_complete(&mut self) -> Result<Option<TestSummary>> {
        if self.state != LifecycleState::Idle {
            debug!("Ignoring build completion in state {:?}", self.state);
            return Ok(None);
        }

        self.state = LifecycleState::Discovering;
        let dir = self.workspace.dir().to_path_buf();
        let discovered = tokio::task::spawn_blocking(move || discover_artifacts(&dir))
            .await
            .unwrap_or_else(|err| {
                warn!("Test discovery failed: {}", err);
                Discovered {
                    files: Vec::new(),
                    errors: 1,
                }
            });
        if discovered.errors > 0 {
            ui::warning(&format!(
                "{} test output entr{} could not be read",
                discovered.errors,
                if discovered.errors == 1 { "y" } else { "ies" }
            ));
        }

        self.state = LifecycleState::Running;
        ui::tests_banner();
        info!("Running {} test file(s)", discovered.files.len());
        for file in discovered.files {
            self.engine.add_file(file);
        }
        let outcome = self.engine.run().await;

        let files = self.engine.files().to_vec();
        for file in &files {
            self.engine.forget(file);
        }
        self.engine.clear_files();
        self.runs += 1;
        self.state = LifecycleState::Idle;

        let summary = outcome?;
        if summary.failed() == 0 {
            ui::success(&ui::format_test_summary(&summary));
        } else {
            ui::error(&ui::format_test_summary(&summary));
        }
        Ok(Some(summary))
    }

    /// Remove the transient directory and stop reacting to completions.
    pub fn shutdown(&mut self) {
        if self.state == LifecycleState::Terminated {
            return;
        }
        self.state = LifecycleState::CleaningUp;
        self.workspace.release();
        self.state = LifecycleState::Terminated;
    }
}
