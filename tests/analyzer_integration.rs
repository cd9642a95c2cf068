//! Integration tests for the recursive analyzer.
//!
//! These tests drive full walks over temporary directory trees with a
//! scripted summarizer, validating traversal coverage, child ordering,
//! failure isolation, and cache behavior.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use repogist::analyzer::{
    AnalysisNode, Analyzer, FileNode, FileOutcome, FolderNode, EMPTY_FOLDER_SUMMARY,
};
use repogist::cache::SummaryCache;
use repogist::config::Config;
use repogist::llm::{LlmError, Summarizer};

/// Scripted summarizer: records every call and can delay or fail the file
/// requests for a chosen filename, or fail all folder reductions.
#[derive(Default)]
struct MockSummarizer {
    calls: Mutex<Vec<String>>,
    delay_for: Option<String>,
    fail_for: Option<String>,
    fail_folders: bool,
}

impl MockSummarizer {
    async fn file_call(&self, kind: &str, filename: &str) -> Result<(), LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", kind, filename));
        if self.delay_for.as_deref() == Some(filename) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if self.fail_for.as_deref() == Some(filename) {
            return Err(LlmError::Timeout);
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn file_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("goal:") || c.starts_with("summary:"))
            .count()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn file_goal(&self, filename: &str, _content: &str) -> Result<String, LlmError> {
        self.file_call("goal", filename).await?;
        Ok(format!("goal of {}", filename))
    }

    async fn file_summary(&self, filename: &str, _content: &str) -> Result<String, LlmError> {
        self.file_call("summary", filename).await?;
        Ok(format!("summary of {}", filename))
    }

    async fn folder_summary(
        &self,
        folder_name: &str,
        child_descriptions: &str,
    ) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("folder:{}", folder_name));
        if self.fail_folders {
            return Err(LlmError::RateLimited);
        }
        Ok(format!(
            "folder {} with {} children",
            folder_name,
            child_descriptions.lines().count()
        ))
    }
}

fn as_folder(node: &AnalysisNode) -> &FolderNode {
    match node {
        AnalysisNode::Folder(f) => f,
        AnalysisNode::File(f) => panic!("expected folder, got file {:?}", f.path),
    }
}

fn as_file(node: &AnalysisNode) -> &FileNode {
    match node {
        AnalysisNode::File(f) => f,
        AnalysisNode::Folder(f) => panic!("expected file, got folder {:?}", f.path),
    }
}

fn child_names(folder: &FolderNode) -> Vec<String> {
    folder
        .children
        .iter()
        .map(|c| {
            c.path()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

async fn analyze_with(mock: Arc<MockSummarizer>, root: &Path) -> AnalysisNode {
    let config = Config::default();
    let analyzer = Analyzer::new(&config, mock);
    analyzer.analyze(root).await.expect("analysis should succeed")
}

#[tokio::test]
async fn test_end_to_end_tree() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("a.py"), "def foo(): pass\n").unwrap();
    std::fs::create_dir(temp.path().join("sub")).unwrap();
    std::fs::write(temp.path().join("sub").join("b.js"), "function bar(){}\n").unwrap();
    std::fs::create_dir(temp.path().join("node_modules")).unwrap();
    std::fs::write(temp.path().join("node_modules").join("junk.js"), "x\n").unwrap();

    let mock = Arc::new(MockSummarizer::default());
    let tree = analyze_with(mock, temp.path()).await;

    let root = as_folder(&tree);
    assert_eq!(
        child_names(root),
        vec!["a.py", "sub"],
        "node_modules must contribute zero nodes"
    );

    let a = as_file(&root.children[0]);
    match &a.outcome {
        FileOutcome::Analyzed(analysis) => {
            assert_eq!(analysis.language, "Python");
            assert_eq!(analysis.functions, vec!["foo"]);
            assert_eq!(analysis.goal, "goal of a.py");
        }
        FileOutcome::Failed { error } => panic!("a.py should analyze, got error {}", error),
    }

    let sub = as_folder(&root.children[1]);
    assert_eq!(child_names(sub), vec!["b.js"]);
    let b = as_file(&sub.children[0]);
    match &b.outcome {
        FileOutcome::Analyzed(analysis) => {
            assert_eq!(analysis.language, "JavaScript");
            assert_eq!(analysis.functions, vec!["bar"]);
        }
        FileOutcome::Failed { error } => panic!("b.js should analyze, got error {}", error),
    }

    assert!(root.summary.starts_with("folder"), "root must be reduced");
}

#[tokio::test]
async fn test_children_keep_enumeration_order_despite_delays() {
    let temp = TempDir::new().unwrap();
    for name in ["a.py", "b.py", "c.py"] {
        std::fs::write(temp.path().join(name), "def f(): pass\n").unwrap();
    }

    // Delaying the first child's model calls must not reorder the children.
    let mock = Arc::new(MockSummarizer {
        delay_for: Some("a.py".to_string()),
        ..Default::default()
    });
    let tree = analyze_with(mock, temp.path()).await;

    let root = as_folder(&tree);
    assert_eq!(child_names(root), vec!["a.py", "b.py", "c.py"]);
}

#[tokio::test]
async fn test_every_eligible_leaf_appears_exactly_once() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("top.py"), "").unwrap();
    std::fs::create_dir_all(temp.path().join("x").join("y")).unwrap();
    std::fs::write(temp.path().join("x").join("mid.js"), "").unwrap();
    std::fs::write(temp.path().join("x").join("y").join("deep.rs"), "").unwrap();
    std::fs::create_dir(temp.path().join(".git")).unwrap();
    std::fs::write(temp.path().join(".git").join("HEAD"), "").unwrap();

    let mock = Arc::new(MockSummarizer::default());
    let tree = analyze_with(mock, temp.path()).await;

    fn collect_files(node: &AnalysisNode, out: &mut Vec<PathBuf>) {
        match node {
            AnalysisNode::File(f) => out.push(f.path.clone()),
            AnalysisNode::Folder(f) => {
                for child in &f.children {
                    collect_files(child, out);
                }
            }
        }
    }

    let mut files = Vec::new();
    collect_files(&tree, &mut files);

    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), files.len(), "no leaf may appear twice");
    assert!(names.contains(&"top.py".to_string()));
    assert!(names.contains(&"mid.js".to_string()));
    assert!(names.contains(&"deep.rs".to_string()));
    assert!(!names.contains(&"HEAD".to_string()), ".git is excluded");
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_file_does_not_block_siblings_or_parent() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("ok.py"), "def f(): pass\n").unwrap();
    let locked = temp.path().join("locked.py");
    std::fs::write(&locked, "secret\n").unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    if std::fs::read(&locked).is_ok() {
        // Permission bits are not enforced (running as root); nothing to test.
        return;
    }

    let mock = Arc::new(MockSummarizer::default());
    let tree = analyze_with(mock.clone(), temp.path()).await;

    let root = as_folder(&tree);
    assert_eq!(child_names(root), vec!["locked.py", "ok.py"]);

    match &as_file(&root.children[0]).outcome {
        FileOutcome::Failed { error } => assert!(!error.is_empty()),
        FileOutcome::Analyzed(_) => panic!("locked.py should carry an error"),
    }
    match &as_file(&root.children[1]).outcome {
        FileOutcome::Analyzed(analysis) => assert_eq!(analysis.goal, "goal of ok.py"),
        FileOutcome::Failed { error } => panic!("ok.py should analyze, got {}", error),
    }

    // The parent reduction still ran, over both children.
    assert!(mock.calls().iter().any(|c| c.starts_with("folder:")));
    assert!(root.summary.contains("2 children"));
}

#[tokio::test]
async fn test_model_failure_is_contained_to_the_node() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("a.py"), "def f(): pass\n").unwrap();
    std::fs::write(temp.path().join("b.py"), "def g(): pass\n").unwrap();

    let mock = Arc::new(MockSummarizer {
        fail_for: Some("b.py".to_string()),
        ..Default::default()
    });
    let tree = analyze_with(mock.clone(), temp.path()).await;

    let root = as_folder(&tree);
    let b = as_file(&root.children[1]);
    match &b.outcome {
        FileOutcome::Analyzed(analysis) => {
            assert!(
                analysis.goal.contains("unavailable"),
                "goal should carry the error marker, got {:?}",
                analysis.goal
            );
            assert!(analysis.summary.contains("unavailable"));
            // Static extraction is unaffected by model failures.
            assert_eq!(analysis.functions, vec!["g"]);
        }
        FileOutcome::Failed { error } => panic!("model failure is not a read failure: {}", error),
    }

    // Sibling and parent both unaffected.
    let a = as_file(&root.children[0]);
    assert!(matches!(a.outcome, FileOutcome::Analyzed(_)));
    assert!(root.summary.starts_with("folder"));

    // Default policy is one retry: two attempts for each failed request.
    let goal_attempts = mock
        .calls()
        .iter()
        .filter(|c| *c == "goal:b.py")
        .count();
    assert_eq!(goal_attempts, 2);
}

#[tokio::test]
async fn test_folder_reduction_failure_still_produces_the_folder() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("a.py"), "def f(): pass\n").unwrap();

    let mock = Arc::new(MockSummarizer {
        fail_folders: true,
        ..Default::default()
    });
    let tree = analyze_with(mock, temp.path()).await;

    let root = as_folder(&tree);
    assert_eq!(root.children.len(), 1);
    assert!(root.summary.contains("unavailable"));
}

#[tokio::test]
async fn test_empty_folder_gets_placeholder_without_model_call() {
    let temp = TempDir::new().unwrap();

    let mock = Arc::new(MockSummarizer::default());
    let tree = analyze_with(mock.clone(), temp.path()).await;

    let root = as_folder(&tree);
    assert!(root.children.is_empty());
    assert_eq!(root.summary, EMPTY_FOLDER_SUMMARY);
    assert!(mock.calls().is_empty(), "no model call for empty input");
}

#[tokio::test]
async fn test_each_file_summarized_at_most_once_per_run() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("a.py"), "def f(): pass\n").unwrap();
    std::fs::write(temp.path().join("b.py"), "def g(): pass\n").unwrap();

    let mock = Arc::new(MockSummarizer::default());
    analyze_with(mock.clone(), temp.path()).await;

    for call in ["goal:a.py", "summary:a.py", "goal:b.py", "summary:b.py"] {
        let count = mock.calls().iter().filter(|c| *c == call).count();
        assert_eq!(count, 1, "{} should happen exactly once", call);
    }
}

#[tokio::test]
async fn test_cache_skips_unchanged_files_and_catches_changes() {
    let temp = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let file = temp.path().join("a.py");
    std::fs::write(&file, "def f(): pass\n").unwrap();

    let config = Config::default();

    // First run populates the cache.
    let first = Arc::new(MockSummarizer::default());
    let analyzer = Analyzer::new(&config, first.clone())
        .with_cache(SummaryCache::at(cache_dir.path()));
    analyzer.analyze(temp.path()).await.unwrap();
    assert_eq!(first.file_call_count(), 2);

    // Second run over unchanged content: cache hit, no file-level calls.
    let second = Arc::new(MockSummarizer::default());
    let analyzer = Analyzer::new(&config, second.clone())
        .with_cache(SummaryCache::at(cache_dir.path()));
    let tree = analyzer.analyze(temp.path()).await.unwrap();
    assert_eq!(second.file_call_count(), 0, "unchanged file must be a hit");

    let root = as_folder(&tree);
    match &as_file(&root.children[0]).outcome {
        FileOutcome::Analyzed(analysis) => assert_eq!(analysis.goal, "goal of a.py"),
        FileOutcome::Failed { error } => panic!("cached node should be analyzed: {}", error),
    }

    // Changing the file invalidates the entry.
    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(&file, "def changed(): pass\n").unwrap();

    let third = Arc::new(MockSummarizer::default());
    let analyzer = Analyzer::new(&config, third.clone())
        .with_cache(SummaryCache::at(cache_dir.path()));
    analyzer.analyze(temp.path()).await.unwrap();
    assert_eq!(third.file_call_count(), 2, "changed file must re-invoke");
}

#[tokio::test]
async fn test_missing_root_is_fatal() {
    let mock = Arc::new(MockSummarizer::default());
    let config = Config::default();
    let analyzer = Analyzer::new(&config, mock);

    let result = analyzer.analyze(Path::new("/no/such/root")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_single_file_root() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("only.py");
    std::fs::write(&file, "def f(): pass\n").unwrap();

    let mock = Arc::new(MockSummarizer::default());
    let tree = analyze_with(mock, &file).await;

    let node = as_file(&tree);
    assert!(node.path.ends_with("only.py"));
    assert!(matches!(node.outcome, FileOutcome::Analyzed(_)));
}
