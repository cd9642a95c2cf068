//! Output formatting for analysis results.
//!
//! Two formats: a colored tree for terminals and pretty-printed JSON for
//! programmatic consumers (the same shape the cache and downstream indexing
//! read back).

use colored::*;
use std::path::Path;

use crate::analyzer::{AnalysisNode, FileOutcome};

/// Serialize a tree to pretty-printed JSON.
pub fn to_json(tree: &AnalysisNode) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

/// Write the JSON tree to a file.
pub fn write_json_file(tree: &AnalysisNode, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, to_json(tree)?)?;
    Ok(())
}

/// Print a colored tree with per-node one-liners and a stats footer.
pub fn write_pretty(tree: &AnalysisNode) {
    print_node(tree, 0);

    let stats = tree.stats();
    println!();
    let mut line = format!(
        "{} folders, {} files analyzed",
        stats.folders, stats.files
    );
    if stats.failed > 0 {
        line.push_str(&format!(", {} unreadable", stats.failed));
    }
    println!("{}", line.bold());
}

fn print_node(node: &AnalysisNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = node
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| node.path().display().to_string());

    match node {
        AnalysisNode::Folder(folder) => {
            println!(
                "{}{} {}",
                indent,
                format!("{}/", name).blue().bold(),
                first_line(&folder.summary).dimmed()
            );
            for child in &folder.children {
                print_node(child, depth + 1);
            }
        }
        AnalysisNode::File(file) => match &file.outcome {
            FileOutcome::Analyzed(analysis) => {
                println!(
                    "{}{} {} {}",
                    indent,
                    name.green(),
                    format!("[{}]", analysis.language).dimmed(),
                    first_line(&analysis.goal)
                );
            }
            FileOutcome::Failed { error } => {
                println!("{}{} {}", indent, name.red(), error.dimmed());
            }
        },
    }
}

/// First line of a summary, capped for terminal display.
fn first_line(text: &str) -> String {
    const MAX: usize = 100;
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= MAX {
        line.to_string()
    } else {
        let cut: String = line.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}
