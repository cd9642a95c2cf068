//! Recursive repository analysis.
//!
//! The analyzer walks a filesystem tree and produces one [`AnalysisNode`]
//! per eligible entry. Files are read, classified, attribute-extracted, and
//! summarized; folders fan out into all surviving children concurrently,
//! wait for every child to settle (a join barrier, not a race), then reduce
//! the children's descriptions into their own summary. A child that fails
//! still joins as an error-carrying node; only an unreachable root aborts
//! the run.

mod filter;
mod node;

pub use filter::{AccessFilter, EXCLUDED_DIRS};
pub use node::{
    AnalysisNode, Document, FileAnalysis, FileNode, FileOutcome, FlattenMode, FolderNode,
    TreeStats,
};

use futures::future::{join_all, BoxFuture, FutureExt};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::cache::SummaryCache;
use crate::config::Config;
use crate::extract;
use crate::language::LanguageMap;
use crate::llm::{with_retry, LlmError, Summarizer};

/// Summary assigned to a folder with no eligible children. The model is not
/// consulted for empty input.
pub const EMPTY_FOLDER_SUMMARY: &str = "Empty folder.";

/// Fatal analysis errors. Everything below the root recovers locally.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("cannot access root path {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Walks a tree and produces its analysis.
///
/// All collaborators are injected at construction and scoped to the runs
/// made with this instance; nothing is process-global.
pub struct Analyzer {
    summarizer: Arc<dyn Summarizer>,
    languages: LanguageMap,
    filter: AccessFilter,
    cache: Option<SummaryCache>,
    permits: Arc<Semaphore>,
    progress: Option<ProgressBar>,
    snippet_cap: usize,
    model_content_cap: usize,
    retries: usize,
}

impl Analyzer {
    pub fn new(config: &Config, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            summarizer,
            languages: LanguageMap::new(config.languages.clone()),
            filter: AccessFilter::new(&config.excluded_dirs, &config.excluded_paths),
            cache: None,
            permits: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            progress: None,
            snippet_cap: config.snippet_cap,
            model_content_cap: config.model_content_cap,
            retries: config.retries,
        }
    }

    /// Consult and maintain a resumable summary cache during the walk.
    pub fn with_cache(mut self, cache: SummaryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Tick a progress bar once per file (analyzed, failed, or cached).
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Analyze the tree rooted at `root`.
    ///
    /// The only fatal error is a missing or unreadable root; every other
    /// failure is absorbed into the tree as a skip or an error-carrying node.
    pub async fn analyze(&self, root: &Path) -> Result<AnalysisNode, AnalyzeError> {
        let root_err = |source| AnalyzeError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        };
        let canonical = tokio::fs::canonicalize(root).await.map_err(root_err)?;
        let metadata = tokio::fs::metadata(&canonical).await.map_err(root_err)?;

        if metadata.is_dir() {
            Ok(self.analyze_folder(canonical).await)
        } else {
            Ok(AnalysisNode::File(self.analyze_file(canonical).await))
        }
    }

    /// Dispatch on the filesystem type decided at enumeration time, never on
    /// the shape of a result. Boxed for recursion.
    fn analyze_entry(&self, path: PathBuf, is_dir: bool) -> BoxFuture<'_, AnalysisNode> {
        async move {
            if is_dir {
                self.analyze_folder(path).await
            } else {
                AnalysisNode::File(self.analyze_file(path).await)
            }
        }
        .boxed()
    }

    async fn analyze_folder(&self, path: PathBuf) -> AnalysisNode {
        let mut entries: Vec<(PathBuf, bool)> = Vec::new();
        match tokio::fs::read_dir(&path).await {
            Ok(mut read_dir) => loop {
                match read_dir.next_entry().await {
                    Ok(Some(entry)) => {
                        let is_dir = entry
                            .file_type()
                            .await
                            .map(|t| t.is_dir())
                            .unwrap_or(false);
                        entries.push((entry.path(), is_dir));
                    }
                    Ok(None) => break,
                    Err(e) => {
                        eprintln!("warning: error listing {}: {}", path.display(), e);
                        break;
                    }
                }
            },
            Err(e) => {
                eprintln!("warning: cannot list {}: {}", path.display(), e);
            }
        }

        // Name order makes the enumeration deterministic across platforms;
        // children keep this order no matter which branch finishes first.
        entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
        let eligible: Vec<(PathBuf, bool)> = entries
            .into_iter()
            .filter(|(entry_path, is_dir)| self.filter.is_eligible(entry_path, *is_dir))
            .collect();

        // Fan-out: every child analyzed concurrently, joined as a barrier.
        let children = join_all(
            eligible
                .iter()
                .map(|(entry_path, is_dir)| self.analyze_entry(entry_path.clone(), *is_dir)),
        )
        .await;

        let summary = if children.is_empty() {
            EMPTY_FOLDER_SUMMARY.to_string()
        } else {
            let folder_name = basename(&path);
            let descriptions = describe_children(&children);
            let summarizer = &*self.summarizer;
            let _permit = self.permits.acquire().await.expect("semaphore closed");
            match with_retry(self.retries, || {
                summarizer.folder_summary(&folder_name, &descriptions)
            })
            .await
            {
                Ok(text) => text,
                Err(e) => unavailable("summary", &e),
            }
        };

        AnalysisNode::Folder(FolderNode {
            path,
            summary,
            children,
        })
    }

    async fn analyze_file(&self, path: PathBuf) -> FileNode {
        let mtime = tokio::fs::metadata(&path)
            .await
            .ok()
            .and_then(|m| m.modified().ok());

        if let (Some(cache), Some(mtime)) = (&self.cache, mtime) {
            if let Some(node) = cache.get(&path, mtime) {
                self.tick();
                return node;
            }
        }

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.tick();
                return FileNode {
                    path,
                    outcome: FileOutcome::Failed {
                        error: e.to_string(),
                    },
                };
            }
        };

        // Permissive decode: undecodable bytes are replaced, never fatal.
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let language = self.languages.classify(&path).to_string();
        let attributes = extract::extract(&content, &language);
        let (functions, classes, dependencies) = attributes.into_sorted_vecs();

        let filename = basename(&path);
        let model_input = truncate_to_boundary(&content, self.model_content_cap);

        // Goal and summary requests run concurrently; the permit bounds
        // model pressure across the whole walk.
        let summarizer = &*self.summarizer;
        let (goal_result, summary_result) = {
            let _permit = self.permits.acquire().await.expect("semaphore closed");
            futures::join!(
                with_retry(self.retries, || summarizer.file_goal(&filename, model_input)),
                with_retry(self.retries, || summarizer
                    .file_summary(&filename, model_input)),
            )
        };

        let complete = goal_result.is_ok() && summary_result.is_ok();
        let goal = goal_result.unwrap_or_else(|e| unavailable("goal", &e));
        let summary = summary_result.unwrap_or_else(|e| unavailable("summary", &e));

        let node = FileNode {
            path,
            outcome: FileOutcome::Analyzed(FileAnalysis {
                language,
                functions,
                classes,
                dependencies,
                goal,
                summary,
                content_snippet: truncate_to_boundary(&content, self.snippet_cap).to_string(),
            }),
        };

        // Error-marker nodes are not cached, so a later run retries them.
        if complete {
            if let (Some(cache), Some(mtime)) = (&self.cache, mtime) {
                cache.set(&node, mtime);
            }
        }

        self.tick();
        node
    }

    fn tick(&self) {
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
    }
}

/// One line per child, in enumeration order: the basename plus the text
/// that describes it.
fn describe_children(children: &[AnalysisNode]) -> String {
    children
        .iter()
        .map(|child| {
            let name = basename(child.path());
            match child {
                AnalysisNode::File(file) => match &file.outcome {
                    FileOutcome::Analyzed(a) => format!("{}: {} {}", name, a.goal, a.summary),
                    FileOutcome::Failed { error } => format!("{}: [unreadable: {}]", name, error),
                },
                AnalysisNode::Folder(folder) => format!("{}: {}", name, folder.summary),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Marker text stored in place of a goal or summary the model never produced.
fn unavailable(kind: &str, err: &LlmError) -> String {
    format!("[{} unavailable: {}]", kind, err)
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Cap a string at `cap` bytes without splitting a UTF-8 character.
fn truncate_to_boundary(s: &str, cap: usize) -> &str {
    if s.len() <= cap {
        return s;
    }
    let mut end = cap;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
