//! Resumable per-file summary cache.
//!
//! Re-running an analysis should not pay for model calls on files that have
//! not changed. The cache maps an analyzed path to its [`FileNode`],
//! validated by modification time: a matching mtime is a hit, anything else
//! is a miss and the file is re-analyzed. Entries live in memory for the
//! current run and as one JSON file per key on disk for later runs.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

use crate::analyzer::FileNode;

/// In-memory + file-based cache of per-file analysis results.
pub struct SummaryCache {
    memory: RwLock<HashMap<String, CacheEntry>>,
    cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    mtime_secs: u64,
    mtime_nanos: u32,
    node: FileNode,
}

impl CacheEntry {
    fn new(mtime: SystemTime, node: FileNode) -> Option<Self> {
        let duration = mtime.duration_since(SystemTime::UNIX_EPOCH).ok()?;
        Some(Self {
            mtime_secs: duration.as_secs(),
            mtime_nanos: duration.subsec_nanos(),
            node,
        })
    }

    fn matches(&self, mtime: SystemTime) -> bool {
        match mtime.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => {
                self.mtime_secs == duration.as_secs()
                    && self.mtime_nanos == duration.subsec_nanos()
            }
            Err(_) => false,
        }
    }
}

impl SummaryCache {
    /// Open the cache in the per-user cache directory.
    pub fn open() -> Self {
        let cache_dir =
            ProjectDirs::from("", "", "repogist").map(|dirs| dirs.cache_dir().join("summaries"));
        Self::with_dir(cache_dir)
    }

    /// Open a cache rooted at a specific directory.
    pub fn at<P: Into<PathBuf>>(dir: P) -> Self {
        Self::with_dir(Some(dir.into()))
    }

    fn with_dir(cache_dir: Option<PathBuf>) -> Self {
        if let Some(ref dir) = cache_dir {
            let _ = fs::create_dir_all(dir);
        }
        Self {
            memory: RwLock::new(HashMap::new()),
            cache_dir,
        }
    }

    /// Fetch a cached node if the stored mtime matches.
    pub fn get(&self, path: &Path, mtime: SystemTime) -> Option<FileNode> {
        let key = cache_key(path);

        {
            let memory = self.memory.read().ok()?;
            if let Some(entry) = memory.get(&key) {
                if entry.matches(mtime) {
                    return Some(entry.node.clone());
                }
            }
        }

        let entry = self.read_file_entry(&key)?;
        if entry.matches(mtime) {
            let node = entry.node.clone();
            if let Ok(mut memory) = self.memory.write() {
                memory.insert(key, entry);
            }
            return Some(node);
        }

        None
    }

    /// Store an analyzed node. Called after each successful file analysis.
    pub fn set(&self, node: &FileNode, mtime: SystemTime) {
        let Some(entry) = CacheEntry::new(mtime, node.clone()) else {
            return;
        };
        let key = cache_key(&node.path);

        if let Ok(mut memory) = self.memory.write() {
            memory.insert(key.clone(), entry.clone());
        }

        if let Some(path) = self.entry_path(&key) {
            if let Ok(json) = serde_json::to_string(&entry) {
                let _ = fs::write(path, json);
            }
        }
    }

    fn read_file_entry(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key)?;
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", key)))
    }
}

/// Sanitize an absolute path into a flat file name.
fn cache_key(path: &Path) -> String {
    path.to_string_lossy().replace(['/', '\\', ':'], "_")
}
