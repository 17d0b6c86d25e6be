//! Similarity ranking of candidate documents

use crate::error::{Result, ServerError};
use agent_llm::EmbeddingProvider;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Orders documents by relevance to a query
#[async_trait]
pub trait SimilarityRanker: Send + Sync {
    /// The `top_k` most relevant documents, best first
    async fn rank(&self, query: &str, documents: &[String], top_k: usize) -> Result<Vec<String>>;
}

/// Ranks by cosine similarity of embeddings
pub struct EmbeddingRanker {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
}

impl EmbeddingRanker {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl SimilarityRanker for EmbeddingRanker {
    #[instrument(skip(self, documents), fields(candidates = documents.len()))]
    async fn rank(&self, query: &str, documents: &[String], top_k: usize) -> Result<Vec<String>> {
        if documents.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut inputs = Vec::with_capacity(documents.len() + 1);
        inputs.push(query.to_string());
        inputs.extend(documents.iter().cloned());

        let vectors = self.provider.embed(&self.model, &inputs).await?;
        let Some((query_vec, doc_vecs)) = vectors.split_first() else {
            return Err(ServerError::Ranking("no embeddings returned".into()));
        };
        if doc_vecs.len() != documents.len() {
            return Err(ServerError::Ranking(format!(
                "expected {} document embeddings, got {}",
                documents.len(),
                doc_vecs.len()
            )));
        }

        let mut scored: Vec<(usize, f32)> = doc_vecs
            .iter()
            .map(|v| cosine_similarity(query_vec, v))
            .enumerate()
            .collect();
        // stable sort keeps input order for equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        debug!("Top scores: {:?}", &scored[..scored.len().min(top_k)]);
        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(idx, _)| documents[idx].clone())
            .collect())
    }
}
