//! Configuration schema for repogist.
//!
//! An analysis run is parameterized by a YAML config file: model names,
//! the extension to language table, prompt templates, exclusion rules, and
//! truncation caps. Everything has a compiled-in default so the tool works
//! with no config file at all.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["repogist.yaml", ".repogist.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Chat model used for summaries and answers.
    pub model: String,
    /// Model used for document embeddings.
    pub embedding_model: String,
    /// Base URL for an OpenAI-compatible API (default: api.openai.com).
    pub base_url: Option<String>,
    /// Extension to language label overrides, layered over the built-in table.
    pub languages: BTreeMap<String, String>,
    /// Directory names to exclude, in addition to the built-in set.
    pub excluded_dirs: Vec<String>,
    /// Glob patterns for paths to exclude (e.g., "**/generated/**").
    pub excluded_paths: Vec<String>,
    /// Max length of the content snippet stored on each file node.
    pub snippet_cap: usize,
    /// Max length of file content sent to the model. Must exceed snippet_cap.
    pub model_content_cap: usize,
    /// Cap on concurrent model requests during a walk.
    pub max_concurrent_requests: usize,
    /// Extra attempts after a failed model call before giving up on a node.
    pub retries: usize,
    /// Number of documents retrieved per question.
    pub top_k: usize,
    /// Prompt templates for summarization and answering.
    pub prompts: Prompts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: None,
            languages: BTreeMap::new(),
            excluded_dirs: Vec::new(),
            excluded_paths: Vec::new(),
            snippet_cap: 2000,
            model_content_cap: 4000,
            max_concurrent_requests: 32,
            retries: 1,
            top_k: 5,
            prompts: Prompts::default(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load a config: an explicit path must parse, otherwise the default
    /// names are searched in the current directory and built-in defaults
    /// apply when none is found.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(p) => Self::parse_file(p)?,
            None => match discover_config() {
                Some(p) => Self::parse_file(p)?,
                None => Config::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the system relies on.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.snippet_cap == 0 || self.model_content_cap == 0 {
            anyhow::bail!("snippet_cap and model_content_cap must be positive");
        }
        if self.snippet_cap > self.model_content_cap {
            anyhow::bail!(
                "snippet_cap ({}) must not exceed model_content_cap ({})",
                self.snippet_cap,
                self.model_content_cap
            );
        }
        if self.max_concurrent_requests == 0 {
            anyhow::bail!("max_concurrent_requests must be at least 1");
        }
        if self.top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }
        Ok(())
    }
}

/// Find a config file with a default name in the current directory.
fn discover_config() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Prompt templates. Placeholders in braces are substituted at call time:
/// `{filename}`, `{content}`, `{folder_name}`, `{child_summaries}`,
/// `{context}`, `{question}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Prompts {
    pub file_goal: String,
    pub file_summary: String,
    pub folder_summary: String,
    pub answer: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            file_goal: DEFAULT_FILE_GOAL.to_string(),
            file_summary: DEFAULT_FILE_SUMMARY.to_string(),
            folder_summary: DEFAULT_FOLDER_SUMMARY.to_string(),
            answer: DEFAULT_ANSWER.to_string(),
        }
    }
}

const DEFAULT_FILE_GOAL: &str = "\
You are an expert software engineer. Read the code below from the file \
`{filename}` and state the main purpose of the file in a single sentence.

CODE:
{content}";

const DEFAULT_FILE_SUMMARY: &str = "\
You are an expert software engineer. Analyze the code below from the file \
`{filename}` and summarize its functional behavior in a concise technical \
explanation.

Focus on what the code does, not a plain text paraphrase. Explain the main \
purpose of the file, key functions or classes and their roles, important \
dependencies, and how data or control flows through it.

Return a short, structured developer summary (3-6 sentences maximum).

CODE:
{content}";

const DEFAULT_FOLDER_SUMMARY: &str = "\
You are analyzing a codebase folder named `{folder_name}`.

Here are summaries of its contents:
{child_summaries}

Combine them into a cohesive technical summary describing the overall purpose \
of this folder, how its files interact or depend on one another, and what \
part of a larger application this folder likely represents (e.g., frontend, \
backend, utils, data processing).

Return a clear, concise developer-oriented summary paragraph.";

const DEFAULT_ANSWER: &str = "\
You are an expert software engineer analyzing a repository.
Use the provided repository context to answer the user's question clearly \
and concisely.

Repository Context:
{context}

User Question: {question}

Your answer:";
