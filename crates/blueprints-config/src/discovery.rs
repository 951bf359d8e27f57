//! Test source discovery for the default test build.
//!
//! Walks the working tree (honouring `.gitignore`) and maps every test source
//! to an entry name. The entry name is the path relative to the root with its
//! final extension removed, so `src/math.test.js` compiles to
//! `.test/src/math.test.compiledtest`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::defaults::TEST_OUTPUT_DIR;

const TEST_MARKERS: &[&str] = &[".test.", ".spec."];
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];
const SKIPPED_DIRS: &[&str] = &["node_modules", "build", "dist"];

/// Entry name → `./`-prefixed source path, in sorted order.
pub type EntryMap = BTreeMap<String, String>;

/// Finds test sources below a root directory.
///
/// # Example
///
/// ```no_run
/// use blueprints_config::TestDiscovery;
///
/// let entries = TestDiscovery::new(".").entries();
/// for (name, source) in &entries {
///     println!("{name} <- {source}");
/// }
/// ```
pub struct TestDiscovery {
    root: PathBuf,
}

impl TestDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Collect the entry mapping. Unreadable paths are logged and skipped.
    pub fn entries(&self) -> EntryMap {
        let output_dir = TEST_OUTPUT_DIR.trim_start_matches("./");
        let mut entries = EntryMap::new();

        let walker = WalkBuilder::new(&self.root)
            .require_git(false)
            .filter_entry(move |entry| {
                let name = entry.file_name().to_string_lossy();
                !(entry.depth() > 0
                    && entry.file_type().is_some_and(|t| t.is_dir())
                    && (SKIPPED_DIRS.contains(&name.as_ref()) || name == output_dir))
            })
            .build();

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("skipping unreadable path during test discovery: {err}");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };

            if let Some((name, source)) = test_entry(relative) {
                tracing::trace!("discovered test entry {name} -> {source}");
                entries.insert(name, source);
            }
        }

        tracing::debug!("discovered {} test entries", entries.len());
        entries
    }
}

/// Map a root-relative path to `(entry name, source path)` if it is a test.
fn test_entry(relative: &Path) -> Option<(String, String)> {
    let file_name = relative.file_name()?.to_str()?;
    let extension = relative.extension()?.to_str()?;

    if !SOURCE_EXTENSIONS.contains(&extension) {
        return None;
    }
    if !TEST_MARKERS.iter().any(|marker| file_name.contains(marker)) {
        return None;
    }

    let normalized = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let name = normalized
        .strip_suffix(&format!(".{extension}"))?
        .to_string();

    Some((name, format!("./{normalized}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "// test").unwrap();
    }

    #[test]
    fn test_entry_strips_extension() {
        assert_eq!(
            test_entry(Path::new("src/math.test.js")),
            Some(("src/math.test".into(), "./src/math.test.js".into()))
        );
        assert_eq!(
            test_entry(Path::new("lib/api.spec.tsx")),
            Some(("lib/api.spec".into(), "./lib/api.spec.tsx".into()))
        );
    }

    #[test]
    fn test_entry_ignores_non_tests() {
        assert_eq!(test_entry(Path::new("src/math.js")), None);
        assert_eq!(test_entry(Path::new("src/notes.test.md")), None);
        assert_eq!(test_entry(Path::new("README")), None);
    }

    #[test]
    fn entries_are_sorted_and_skip_vendor_dirs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/b.test.js");
        touch(dir.path(), "src/a.spec.ts");
        touch(dir.path(), "src/app.js");
        touch(dir.path(), "node_modules/pkg/index.test.js");
        touch(dir.path(), ".test/src/b.test.compiledtest");

        let entries = TestDiscovery::new(dir.path()).entries();
        let names: Vec<_> = entries.keys().cloned().collect();
        assert_eq!(names, vec!["src/a.spec", "src/b.test"]);
        assert_eq!(entries["src/b.test"], "./src/b.test.js");
    }

    #[test]
    fn empty_tree_yields_no_entries() {
        let dir = TempDir::new().unwrap();
        assert!(TestDiscovery::new(dir.path()).entries().is_empty());
    }
}
