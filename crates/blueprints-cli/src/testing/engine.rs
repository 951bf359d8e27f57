//! Test engine seam and the process-backed runner.

use crate::error::{Result, TestError};
use crate::settings::CommandLine;
use crate::ui;
use async_trait::async_trait;
use owo_colors::Style;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// How test results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reporter {
    /// One line per artifact plus the runner's output
    #[default]
    Spec,
    /// One character per artifact; output only for failures
    Dot,
}

/// Counts from one test run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: usize,
    /// Artifacts whose runner exited unsuccessfully
    pub failures: Vec<String>,
    pub duration: Duration,
}

impl TestSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed()
    }
}

/// External test engine.
///
/// Files are registered one by one and run as a suite. After a run the
/// registered files stay visible through [`files`](TestEngine::files) so the
/// caller can [`forget`](TestEngine::forget) their cached content before the
/// next run.
#[async_trait]
pub trait TestEngine: Send {
    fn reporter(&self) -> Reporter;

    fn add_file(&mut self, path: PathBuf);

    fn files(&self) -> &[PathBuf];

    async fn run(&mut self) -> Result<TestSummary>;

    /// Drop any cached state for `path`. Returns whether anything was cached.
    fn forget(&mut self, path: &Path) -> bool;

    /// Unregister all files.
    fn clear_files(&mut self);
}

/// Content of loaded test artifacts, keyed by absolute path.
///
/// A loaded artifact is served from memory until it is forgotten.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: HashMap<PathBuf, Arc<str>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> std::io::Result<Arc<str>> {
        let key = Self::key(path);
        if let Some(content) = self.entries.get(&key) {
            return Ok(Arc::clone(content));
        }
        let content: Arc<str> = std::fs::read_to_string(&key)?.into();
        self.entries.insert(key, Arc::clone(&content));
        Ok(content)
    }

    pub fn forget(&mut self, path: &Path) -> bool {
        self.entries.remove(&Self::key(path)).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&Self::key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(path: &Path) -> PathBuf {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Runs each artifact by piping its content into the test runner command.
#[derive(Debug)]
pub struct ProcessTestEngine {
    runner: CommandLine,
    reporter: Reporter,
    files: Vec<PathBuf>,
    cache: ArtifactCache,
}

impl ProcessTestEngine {
    pub fn new(runner: CommandLine, reporter: Reporter) -> Self {
        Self {
            runner,
            reporter,
            files: Vec::new(),
            cache: ArtifactCache::new(),
        }
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    async fn run_file(&mut self, path: &Path) -> Result<RunOutcome> {
        let Some((program, args)) = self.runner.split() else {
            return Err(TestError::NoRunner.into());
        };

        let content = self.cache.load(path).map_err(|source| TestError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let spawn_error = |source| TestError::Spawn {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(content.as_bytes()).await {
                debug!("Test runner did not read {}: {}", path.display(), err);
            }
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        let mut log = output.stdout;
        log.extend_from_slice(&output.stderr);

        Ok(RunOutcome {
            passed: output.status.success(),
            log: String::from_utf8_lossy(&log).into_owned(),
        })
    }

    fn report(&self, path: &Path, outcome: &RunOutcome) {
        let name = path.display().to_string();
        match self.reporter {
            Reporter::Spec => {
                if outcome.passed {
                    println!("  {} {}", ui::paint("✓", Style::new().green()), name);
                } else {
                    println!("  {} {}", ui::paint("✗", Style::new().red()), name);
                }
                print_indented(&outcome.log);
            }
            Reporter::Dot => {
                let mark = if outcome.passed {
                    ui::paint(".", Style::new().green())
                } else {
                    ui::paint("F", Style::new().red())
                };
                print!("{mark}");
                let _ = std::io::stdout().flush();
            }
        }
    }
}

struct RunOutcome {
    passed: bool,
    log: String,
}

fn print_indented(log: &str) {
    for line in log.lines() {
        println!("    {line}");
    }
}

#[async_trait]
impl TestEngine for ProcessTestEngine {
    fn reporter(&self) -> Reporter {
        self.reporter
    }

    fn add_file(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    fn files(&self) -> &[PathBuf] {
        &self.files
    }

    async fn run(&mut self) -> Result<TestSummary> {
        let started = Instant::now();
        let mut summary = TestSummary::default();
        let mut failed_logs = Vec::new();

        for path in self.files.clone() {
            let outcome = self.run_file(&path).await?;
            self.report(&path, &outcome);
            if outcome.passed {
                summary.passed += 1;
            } else {
                summary.failures.push(path.display().to_string());
                failed_logs.push((path, outcome.log));
            }
        }

        if self.reporter == Reporter::Dot {
            println!();
            for (path, log) in &failed_logs {
                println!("  {} {}", ui::paint("✗", Style::new().red()), path.display());
                print_indented(log);
            }
        }

        summary.duration = started.elapsed();
        Ok(summary)
    }

    fn forget(&mut self, path: &Path) -> bool {
        self.cache.forget(path)
    }

    fn clear_files(&mut self) {
        self.files.clear();
    }
}
