//! Entry eligibility checks for the walk.
//!
//! The filter runs exactly once per directory entry, before recursion is
//! scheduled. It excludes well-known non-source directories, user-supplied
//! glob patterns, symlinks, and anything the process cannot read; skips are
//! logged, never fatal.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::Path;

/// Directory names that never join the walk: version-control metadata,
/// dependency caches, virtual environments, build artifacts, editor state.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "target",
    "build",
    "dist",
    ".idea",
    ".vscode",
    ".cache",
    ".next",
    "vendor",
    ".eggs",
];

/// Decides which directory entries the walker may recurse into.
pub struct AccessFilter {
    excluded_dirs: HashSet<String>,
    excluded_paths: Option<GlobSet>,
}

impl AccessFilter {
    /// Build a filter from extra directory names and glob patterns layered
    /// over the built-in exclusion set. Invalid globs are ignored.
    pub fn new(extra_dirs: &[String], excluded_paths: &[String]) -> Self {
        let mut excluded_dirs: HashSet<String> =
            EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect();
        excluded_dirs.extend(extra_dirs.iter().cloned());

        let excluded_paths = if excluded_paths.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in excluded_paths {
                if let Ok(glob) = Glob::new(pattern) {
                    builder.add(glob);
                }
            }
            builder.build().ok()
        };

        Self {
            excluded_dirs,
            excluded_paths,
        }
    }

    /// Whether an entry joins the walk. Runs before recursion is scheduled,
    /// never after.
    pub fn is_eligible(&self, path: &Path, is_dir: bool) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if is_dir && self.excluded_dirs.contains(name) {
            debug_skip(path, "excluded directory");
            return false;
        }

        if let Some(set) = &self.excluded_paths {
            if set.is_match(path) {
                debug_skip(path, "excluded by pattern");
                return false;
            }
        }

        // Symlinks are skipped: following them can revisit paths or cycle,
        // which would break the one-node-per-path invariant.
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                debug_skip(path, "symlink");
                return false;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("warning: skipping {}: {}", path.display(), e);
                return false;
            }
        }

        // Read-access probe for directories. File read errors are handled at
        // read time so they still produce an error-carrying node.
        if is_dir {
            if let Err(e) = std::fs::read_dir(path) {
                eprintln!("warning: skipping unreadable directory {}: {}", path.display(), e);
                return false;
            }
        }

        true
    }
}

fn debug_skip(path: &Path, reason: &str) {
    if std::env::var("REPOGIST_DEBUG").is_ok() {
        eprintln!("[debug] skipping {}: {}", path.display(), reason);
    }
}
