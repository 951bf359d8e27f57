//! Scoped ownership of the transient test output directory.
//!
//! The directory is removed exactly once, whichever exit path gets there
//! first: an explicit release, drop, Ctrl-C, or a panic.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug)]
pub struct TransientWorkspace {
    dir: PathBuf,
    released: AtomicBool,
}

impl TransientWorkspace {
    /// Take ownership of `dir` for the rest of the process.
    pub fn acquire(dir: impl Into<PathBuf>) -> Arc<Self> {
        let dir = dir.into();
        debug!("Acquired transient workspace {}", dir.display());
        Arc::new(Self {
            dir,
            released: AtomicBool::new(false),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Remove the directory. Only the first call does anything; it returns
    /// `true`. Removal errors are swallowed.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }

        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!("Removed {}", self.dir.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => debug!("Could not remove {}: {}", self.dir.display(), err),
        }
        true
    }

    /// Interrupt path: release, then report the exit status to use.
    pub fn on_interrupt(&self) -> i32 {
        self.release();
        0
    }

    /// Panic path: release, then report the exit status to use.
    pub fn on_panic(&self) -> i32 {
        self.release();
        1
    }

    /// On Ctrl-C: release, then exit with status 0.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn install_interrupt_handler(self: &Arc<Self>) {
        let workspace = Arc::clone(self);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(workspace.on_interrupt());
            }
        });
    }

    /// On panic: report through the previous hook, release, exit with status 1.
    pub fn install_panic_hook(self: &Arc<Self>) {
        let workspace = Arc::clone(self);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            previous(info);
            std::process::exit(workspace.on_panic());
        }));
    }
}

impl Drop for TransientWorkspace {
    fn drop(&mut self) {
        self.release();
    }
}
