//! Document indexing and retrieval-augmented answering.
//!
//! The flattened analysis tree becomes an in-memory vector index: each
//! document is embedded once, and a question retrieves the top-k documents
//! by cosine similarity, which are then handed to the chat model as context.
//! The index lives for one session; nothing is persisted.

use crate::analyzer::Document;
use crate::config::Config;
use crate::llm::{render_template, ChatModel, Embedder, LlmError};

/// Documents per embedding request.
const EMBED_BATCH: usize = 64;

/// In-memory vector store over flattened analysis documents.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

struct IndexEntry {
    document: Document,
    embedding: Vec<f32>,
}

impl VectorIndex {
    /// Embed all documents and build the index.
    pub async fn build(
        documents: Vec<Document>,
        embedder: &dyn Embedder,
    ) -> Result<Self, LlmError> {
        let mut entries = Vec::with_capacity(documents.len());

        for batch in documents.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(Document::text).collect();
            let embeddings = embedder.embed(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(LlmError::MalformedResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }
            for (document, embedding) in batch.iter().cloned().zip(embeddings) {
                entries.push(IndexEntry {
                    document,
                    embedding,
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k documents by cosine similarity to the query vector.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<&Document> {
        let mut scored: Vec<(f32, &Document)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(query, &e.embedding), &e.document))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(k).map(|(_, doc)| doc).collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Answer a question with the retrieved documents as context.
pub async fn answer(
    question: &str,
    index: &VectorIndex,
    embedder: &dyn Embedder,
    model: &dyn ChatModel,
    config: &Config,
) -> Result<String, LlmError> {
    let query = embedder
        .embed(&[question.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedResponse("no query embedding".to_string()))?;

    let retrieved = index.search(&query, config.top_k);
    let context = retrieved
        .iter()
        .map(|doc| doc.text())
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    let prompt = render_template(
        &config.prompts.answer,
        &[("context", context.as_str()), ("question", question)],
    );
    model.complete(&prompt).await
}
