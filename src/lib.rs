//! Repogist - LLM-powered repository analysis and question answering.
//!
//! Repogist walks a repository tree, summarizes every file and folder with a
//! language model, and aggregates child summaries into parent summaries
//! bottom-up. The resulting tree can be serialized, cached across runs, and
//! flattened into documents for retrieval-augmented question answering.
//!
//! # Architecture
//!
//! - `language`: file extension to language label classification
//! - `extract`: static extraction of functions, classes, and dependencies
//! - `llm`: model client traits and the OpenAI-compatible implementation
//! - `analyzer`: the recursive tree walker, access filter, and node types
//! - `cache`: resumable per-file summary cache
//! - `index`: document embedding, vector search, and answer generation
//! - `fetch`: cloning remote repositories into a temporary working copy
//! - `report`: output formatting (pretty tree, JSON)
//!
//! The walker takes its model client, prompt templates, and language table
//! as explicit configuration scoped to one analysis run; nothing is wired up
//! at process scope.

pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod index;
pub mod language;
pub mod llm;
pub mod report;

pub use analyzer::{
    AnalysisNode, AnalyzeError, Analyzer, Document, FileAnalysis, FileNode, FileOutcome,
    FlattenMode, FolderNode,
};
pub use cache::SummaryCache;
pub use config::Config;
pub use extract::CodeAttributes;
pub use index::VectorIndex;
pub use language::LanguageMap;
pub use llm::{ChatModel, Embedder, LlmError, Summarizer};
