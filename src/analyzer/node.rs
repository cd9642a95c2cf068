//! The analysis result tree.
//!
//! One analysis run produces a single [`AnalysisNode`] tree: a tagged union
//! of file and folder nodes. A file node either carries a full analysis or,
//! exclusively, a read error; the two cannot coexist by construction. The
//! tree is immutable once built and is handed downstream as a read-only
//! flattened document list.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A node in the analysis tree. Files are always leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisNode {
    File(FileNode),
    Folder(FolderNode),
}

impl AnalysisNode {
    pub fn path(&self) -> &Path {
        match self {
            AnalysisNode::File(f) => &f.path,
            AnalysisNode::Folder(f) => &f.path,
        }
    }

    /// Flatten the tree into documents for indexing.
    pub fn flatten(&self, mode: FlattenMode) -> Vec<Document> {
        let mut docs = Vec::new();
        self.flatten_into(mode, &mut docs);
        docs
    }

    fn flatten_into(&self, mode: FlattenMode, docs: &mut Vec<Document>) {
        match self {
            AnalysisNode::File(file) => {
                if let FileOutcome::Analyzed(analysis) = &file.outcome {
                    docs.push(Document {
                        path: file.path.clone(),
                        goal: analysis.goal.clone(),
                        summary: analysis.summary.clone(),
                    });
                }
            }
            AnalysisNode::Folder(folder) => {
                if mode == FlattenMode::WithFolders {
                    docs.push(Document {
                        path: folder.path.clone(),
                        goal: String::new(),
                        summary: folder.summary.clone(),
                    });
                }
                for child in &folder.children {
                    child.flatten_into(mode, docs);
                }
            }
        }
    }

    /// Count files, failures, and folders across the tree.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.collect_stats(&mut stats);
        stats
    }

    fn collect_stats(&self, stats: &mut TreeStats) {
        match self {
            AnalysisNode::File(file) => match file.outcome {
                FileOutcome::Analyzed(_) => stats.files += 1,
                FileOutcome::Failed { .. } => stats.failed += 1,
            },
            AnalysisNode::Folder(folder) => {
                stats.folders += 1;
                for child in &folder.children {
                    child.collect_stats(stats);
                }
            }
        }
    }
}

/// A single analyzed (or unreadable) file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// What became of a file: analyzed content, or nothing but the read error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Analyzed(FileAnalysis),
    Failed { error: String },
}

/// The full analysis payload of a readable file.
///
/// `functions`, `classes`, and `dependencies` are sorted and deduplicated.
/// `content_snippet` is a bounded prefix of the decoded content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub language: String,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub dependencies: Vec<String>,
    pub goal: String,
    pub summary: String,
    pub content_snippet: String,
}

/// A folder with its reduced summary and ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    pub path: PathBuf,
    pub summary: String,
    pub children: Vec<AnalysisNode>,
}

/// Counts over one tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub files: usize,
    pub failed: usize,
    pub folders: usize,
}

/// How folders participate in flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlattenMode {
    /// One document per analyzed file; folders contribute nothing.
    FilesOnly,
    /// Additionally one document per folder.
    WithFolders,
}

/// A flattened unit handed to the indexing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub path: PathBuf,
    pub goal: String,
    pub summary: String,
}

impl Document {
    /// The text that gets embedded and retrieved.
    pub fn text(&self) -> String {
        format!("{}\n{}\n{}", self.path.display(), self.goal, self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed_file(path: &str, goal: &str) -> AnalysisNode {
        AnalysisNode::File(FileNode {
            path: PathBuf::from(path),
            outcome: FileOutcome::Analyzed(FileAnalysis {
                language: "Python".to_string(),
                functions: vec!["foo".to_string()],
                classes: vec![],
                dependencies: vec![],
                goal: goal.to_string(),
                summary: format!("summary of {}", path),
                content_snippet: String::new(),
            }),
        })
    }

    fn failed_file(path: &str) -> AnalysisNode {
        AnalysisNode::File(FileNode {
            path: PathBuf::from(path),
            outcome: FileOutcome::Failed {
                error: "permission denied".to_string(),
            },
        })
    }

    fn sample_tree() -> AnalysisNode {
        AnalysisNode::Folder(FolderNode {
            path: PathBuf::from("/repo"),
            summary: "root summary".to_string(),
            children: vec![
                analyzed_file("/repo/a.py", "parse things"),
                AnalysisNode::Folder(FolderNode {
                    path: PathBuf::from("/repo/sub"),
                    summary: "sub summary".to_string(),
                    children: vec![analyzed_file("/repo/sub/b.js", "render things")],
                }),
                failed_file("/repo/locked.bin"),
            ],
        })
    }

    #[test]
    fn test_flatten_files_only() {
        let docs = sample_tree().flatten(FlattenMode::FilesOnly);
        let paths: Vec<_> = docs.iter().map(|d| d.path.display().to_string()).collect();
        assert_eq!(paths, vec!["/repo/a.py", "/repo/sub/b.js"]);
    }

    #[test]
    fn test_flatten_with_folders() {
        let docs = sample_tree().flatten(FlattenMode::WithFolders);
        let paths: Vec<_> = docs.iter().map(|d| d.path.display().to_string()).collect();
        assert_eq!(
            paths,
            vec!["/repo", "/repo/a.py", "/repo/sub", "/repo/sub/b.js"]
        );
    }

    #[test]
    fn test_failed_files_contribute_no_documents() {
        let docs = sample_tree().flatten(FlattenMode::FilesOnly);
        assert!(docs.iter().all(|d| !d.path.ends_with("locked.bin")));
    }

    #[test]
    fn test_stats() {
        let stats = sample_tree().stats();
        assert_eq!(
            stats,
            TreeStats {
                files: 2,
                failed: 1,
                folders: 2
            }
        );
    }

    #[test]
    fn test_file_node_json_shape() {
        let node = analyzed_file("/repo/a.py", "parse things");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["language"], "Python");
        assert_eq!(json["functions"][0], "foo");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failed_node_json_carries_only_path_and_error() {
        let node = failed_file("/repo/locked.bin");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["error"], "permission denied");
        assert!(json.get("language").is_none());
        assert!(json.get("summary").is_none());
    }

    #[test]
    fn test_tree_json_round_trip() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: AnalysisNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
