//! Build engine backed by an external bundler process.
//!
//! Every build in the set is handed to its own bundler process: the
//! normalized build document goes to the process's stdin as JSON, the
//! process's stdout is passed through, and a non-zero exit turns into a
//! [`BuildDiagnostic`] carrying the tail of its stderr.

use super::{BuildDiagnostic, BuildEngine, BuildResult, FileWatcher};
use crate::error::{BuildError, Result};
use crate::settings::{CommandLine, RunnerSettings};
use async_trait::async_trait;
use blueprints_config::{BuildConfig, ResolvedConfigSet};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Lines of bundler stderr kept in a diagnostic.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct ProcessEngine {
    bundler: CommandLine,
    root: PathBuf,
    debounce_ms: u64,
    watch_ignore: Vec<String>,
}

impl ProcessEngine {
    pub fn new(settings: &RunnerSettings, root: impl Into<PathBuf>) -> Self {
        Self {
            bundler: settings.bundler.clone(),
            root: root.into(),
            debounce_ms: settings.debounce_ms,
            watch_ignore: settings.watch_ignore.clone(),
        }
    }
}

#[async_trait]
impl BuildEngine for ProcessEngine {
    async fn invoke(&self, builds: Arc<ResolvedConfigSet>) -> Result<mpsc::Receiver<BuildResult>> {
        if self.bundler.is_empty() {
            return Err(BuildError::NoBundler.into());
        }

        let mut watch = if builds.watch_enabled() {
            let (watcher, changes) =
                FileWatcher::new(self.root.clone(), self.watch_ignore.clone(), self.debounce_ms)?;
            info!("Watching {} for changes", watcher.root().display());
            Some((watcher, changes))
        } else {
            None
        };

        // Capacity 1: a pass never runs far ahead of the supervisor.
        let (tx, rx) = mpsc::channel(1);
        let bundler = self.bundler.clone();
        let root = self.root.clone();

        tokio::spawn(async move {
            loop {
                let result = run_pass(&bundler, &root, &builds).await;
                if tx.send(result).await.is_err() {
                    break;
                }

                let Some((watcher, changes)) = watch.as_mut() else {
                    break;
                };
                match watcher.next_batch(changes).await {
                    Some(batch) => {
                        debug!("Changed: {}", batch[0].path().display());
                        info!("{} file(s) changed, rebuilding", batch.len());
                    }
                    None => break,
                }
            }
        });

        Ok(rx)
    }
}

/// Run every build concurrently; diagnostics keep the set's order.
async fn run_pass(bundler: &CommandLine, root: &Path, builds: &ResolvedConfigSet) -> BuildResult {
    let started = Instant::now();

    let handles: Vec<_> = builds
        .iter()
        .enumerate()
        .map(|(index, build)| {
            let name = build
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("build-{index}"));
            let task = tokio::spawn(build_one(
                bundler.clone(),
                root.to_path_buf(),
                name.clone(),
                build.clone(),
            ));
            (name, task)
        })
        .collect();

    let mut errors = Vec::new();
    for (name, task) in handles {
        match task.await {
            Ok(Ok(None)) => {}
            Ok(Ok(Some(diagnostic))) => errors.push(diagnostic),
            Ok(Err(err)) => errors.push(BuildDiagnostic::new(name, err.to_string())),
            Err(err) => errors.push(BuildDiagnostic::new(name, format!("build task failed: {err}"))),
        }
    }

    BuildResult::failed(errors, started.elapsed())
}

async fn build_one(
    bundler: CommandLine,
    root: PathBuf,
    name: String,
    build: BuildConfig,
) -> std::result::Result<Option<BuildDiagnostic>, BuildError> {
    let Some((program, args)) = bundler.split() else {
        return Err(BuildError::NoBundler);
    };

    let payload = match serde_json::to_vec(&build) {
        Ok(payload) => payload,
        Err(err) => {
            return Ok(Some(BuildDiagnostic::new(
                name,
                format!("could not serialize build: {err}"),
            )));
        }
    };

    debug!("Spawning {} for build '{}'", bundler, name);
    let spawn_error = |source| BuildError::Spawn {
        program: program.to_string(),
        source,
    };

    let mut child = Command::new(program)
        .args(args)
        .current_dir(&root)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(spawn_error)?;

    if let Some(mut stdin) = child.stdin.take() {
        // A bundler that exits without reading stdin closes the pipe early.
        if let Err(err) = stdin.write_all(&payload).await {
            debug!("Bundler for '{}' did not read its input: {}", name, err);
        }
    }

    let output = child.wait_with_output().await.map_err(spawn_error)?;
    if output.status.success() {
        return Ok(None);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(Some(BuildDiagnostic::new(
        name,
        failure_message(output.status, &stderr),
    )))
}

fn failure_message(status: ExitStatus, stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.is_empty() {
        return format!("bundler exited with {status}");
    }
    let tail = &lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..];
    tail.join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use blueprints_config::{ConfigResolver, InvocationOptions};
    use tempfile::TempDir;

    fn settings(bundler: &[&str]) -> RunnerSettings {
        RunnerSettings {
            bundler: CommandLine::new(bundler.iter().copied()),
            ..Default::default()
        }
    }

    fn default_builds(root: &Path) -> Arc<ResolvedConfigSet> {
        let options = InvocationOptions {
            ignore_blueprints: true,
            ..Default::default()
        };
        Arc::new(ConfigResolver::new(root).resolve(&options).unwrap())
    }

    #[tokio::test]
    async fn test_successful_bundler_reports_once() {
        let dir = TempDir::new().unwrap();
        let engine = ProcessEngine::new(&settings(&["sh", "-c", "cat > /dev/null"]), dir.path());

        let mut results = engine.invoke(default_builds(dir.path())).await.unwrap();
        let result = results.recv().await.unwrap();
        assert!(!result.has_errors());
        assert!(results.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_failing_bundler_reports_stderr_per_build() {
        let dir = TempDir::new().unwrap();
        let engine = ProcessEngine::new(
            &settings(&["sh", "-c", "cat > /dev/null; echo 'Module not found' >&2; exit 2"]),
            dir.path(),
        );

        let mut results = engine.invoke(default_builds(dir.path())).await.unwrap();
        let result = results.recv().await.unwrap();
        let builds: Vec<_> = result.errors.iter().map(|e| e.build.as_str()).collect();
        assert_eq!(builds, vec!["client", "server"]);
        assert!(result.errors.iter().all(|e| e.message == "Module not found"));
    }

    #[tokio::test]
    async fn test_bundler_receives_build_json() {
        let dir = TempDir::new().unwrap();
        let engine = ProcessEngine::new(
            &settings(&["sh", "-c", "cat > \"$(mktemp -p . build-XXXXXX)\""]),
            dir.path(),
        );

        let mut results = engine.invoke(default_builds(dir.path())).await.unwrap();
        assert!(!results.recv().await.unwrap().has_errors());

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let text = std::fs::read_to_string(entry.unwrap().path()).unwrap();
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            names.push(value["name"].as_str().unwrap().to_string());
        }
        names.sort();
        assert_eq!(names, vec!["client", "server"]);
    }

    #[tokio::test]
    async fn test_missing_bundler_is_a_diagnostic() {
        let dir = TempDir::new().unwrap();
        let engine = ProcessEngine::new(&settings(&["definitely-not-a-bundler-binary"]), dir.path());

        let mut results = engine.invoke(default_builds(dir.path())).await.unwrap();
        let result = results.recv().await.unwrap();
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].message.contains("definitely-not-a-bundler-binary"));
    }

    #[tokio::test]
    async fn test_empty_bundler_is_rejected() {
        let dir = TempDir::new().unwrap();
        let engine = ProcessEngine::new(&settings(&[]), dir.path());
        let err = engine.invoke(default_builds(dir.path())).await.unwrap_err();
        assert!(matches!(err, crate::error::CliError::Build(BuildError::NoBundler)));
    }

    #[test]
    fn test_failure_message_keeps_tail() {
        let stderr: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let status = std::process::Command::new("false").status().unwrap();
        let message = failure_message(status, &stderr);
        assert_eq!(message.lines().count(), STDERR_TAIL_LINES);
        assert!(message.ends_with("line 29"));
    }
}
