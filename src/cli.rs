//! Command-line interface for repogist.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::analyzer::{AccessFilter, AnalysisNode, Analyzer, FlattenMode};
use crate::cache::SummaryCache;
use crate::config::Config;
use crate::fetch;
use crate::index::{self, VectorIndex};
use crate::llm::{LlmSummarizer, OpenAiClient};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// LLM-powered repository summarizer.
///
/// Repogist walks a repository, summarizes every file and folder with a
/// language model bottom-up, and can answer questions about the result
/// using retrieval-augmented generation.
#[derive(Parser)]
#[command(name = "repogist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a repository into a hierarchical summary tree
    Analyze(AnalyzeArgs),
    /// Analyze a repository and answer a question about it
    Ask(AskArgs),
    /// Create a repogist config file with the default settings
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Local path to analyze
    pub path: Option<PathBuf>,

    /// Remote repository URL to clone and analyze instead of a local path
    #[arg(long, conflicts_with = "path")]
    pub repo: Option<String>,

    /// Path to config YAML (default: auto-discover repogist.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Also write the JSON tree to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable the resumable summary cache
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the ask command.
#[derive(Parser)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    /// Local path to analyze
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Remote repository URL to clone and analyze instead of a local path
    #[arg(long, conflicts_with = "path")]
    pub repo: Option<String>,

    /// Path to config YAML (default: auto-discover repogist.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Index one document per folder in addition to the per-file documents
    #[arg(long)]
    pub include_folders: bool,

    /// Disable the resumable summary cache
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "repogist.yaml")]
    pub output: PathBuf,
}

/// Default config file template.
const CONFIG_TEMPLATE: &str = include_str!("templates/repogist.yaml");

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = Config::load(args.config.as_deref())?;

    let runtime = tokio::runtime::Runtime::new()?;
    let tree = runtime.block_on(analyze_source(
        &config,
        args.path.as_deref(),
        args.repo.as_deref(),
        args.no_cache,
    ))?;

    match args.format.as_str() {
        "json" => println!("{}", report::to_json(&tree)?),
        _ => report::write_pretty(&tree),
    }

    if let Some(output) = &args.output {
        report::write_json_file(&tree, output)?;
        eprintln!("Wrote {}", output.display());
    }

    Ok(EXIT_SUCCESS)
}

/// Run the ask command.
pub fn run_ask(args: &AskArgs) -> anyhow::Result<i32> {
    let config = Config::load(args.config.as_deref())?;

    let runtime = tokio::runtime::Runtime::new()?;
    let answer = runtime.block_on(async {
        let tree = analyze_source(
            &config,
            args.path.as_deref(),
            args.repo.as_deref(),
            args.no_cache,
        )
        .await?;

        let mode = if args.include_folders {
            FlattenMode::WithFolders
        } else {
            FlattenMode::FilesOnly
        };
        let documents = tree.flatten(mode);
        if documents.is_empty() {
            anyhow::bail!("nothing to index: no files were analyzed");
        }

        let client = OpenAiClient::from_config(&config)?;
        eprintln!("Indexing {} documents...", documents.len());
        let vector_index = VectorIndex::build(documents, &client).await?;

        let answer =
            index::answer(&args.question, &vector_index, &client, &client, &config).await?;
        Ok::<String, anyhow::Error>(answer)
    })?;

    println!("{}", answer);
    Ok(EXIT_SUCCESS)
}

/// Resolve the analysis root (cloning if needed) and walk it.
async fn analyze_source(
    config: &Config,
    path: Option<&Path>,
    repo: Option<&str>,
    no_cache: bool,
) -> anyhow::Result<AnalysisNode> {
    // The tempdir guard must outlive the walk when a clone is involved.
    let (_clone_guard, root) = match (path, repo) {
        (_, Some(url)) => {
            let (guard, checkout) = fetch::fetch_repository(url).await?;
            (Some(guard), checkout)
        }
        (Some(p), None) => (None, p.to_path_buf()),
        (None, None) => anyhow::bail!("provide a path or --repo <url>"),
    };

    let client = OpenAiClient::from_config(config)?;
    let summarizer = Arc::new(LlmSummarizer::new(client, config.prompts.clone()));

    let progress = progress_bar(count_files(&root, config));
    let mut analyzer = Analyzer::new(config, summarizer).with_progress(progress.clone());
    if !no_cache {
        analyzer = analyzer.with_cache(SummaryCache::open());
    }

    let tree = analyzer.analyze(&root).await?;
    progress.finish_and_clear();
    Ok(tree)
}

/// Count the files the walk will visit, for the progress bar length.
fn count_files(root: &Path, config: &Config) -> u64 {
    let filter = AccessFilter::new(&config.excluded_dirs, &config.excluded_paths);
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || filter.is_eligible(e.path(), e.file_type().is_dir()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count() as u64
}

fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} files ({elapsed})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize models and exclusions", args.output.display());
    println!("  2. Export OPENAI_API_KEY");
    println!("  3. Run: repogist analyze . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_template_parses_and_validates() {
        let config: Config = serde_yaml::from_str(CONFIG_TEMPLATE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.snippet_cap, 2000);
    }

    #[test]
    fn test_count_files_applies_filter() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.py"), "").unwrap();
        std::fs::create_dir(temp.path().join("node_modules")).unwrap();
        std::fs::write(temp.path().join("node_modules").join("b.js"), "").unwrap();

        let config = Config::default();
        assert_eq!(count_files(temp.path(), &config), 1);
    }

    #[test]
    fn test_count_files_ignores_root_name() {
        // A root that happens to share a name with an excluded directory is
        // still walked; only children are filtered.
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().join("build");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("a.py"), "").unwrap();

        let config = Config::default();
        assert_eq!(count_files(&root, &config), 1);
    }
}
