use std::sync::Arc;

use crate::error::PipelineError;
use crate::models::{Corpus, RetrievedMatch};
use crate::services::{EmbeddingProvider, VectorStore};
use crate::Result;

/// Nearest-neighbor search over one corpus collection
pub struct CorpusSearch {
  corpus: Corpus,
  embedder: Arc<dyn EmbeddingProvider>,
  store: Arc<dyn VectorStore>,
}

impl CorpusSearch {
  pub fn new(corpus: Corpus, embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
    Self { corpus, embedder, store }
  }

  pub fn corpus(&self) -> Corpus {
    self.corpus
  }

  /// At most `top_k` matches, ascending by distance as the store ordered them.
  ///
  /// Embedding failures come back as `EmbeddingUnavailable`; anything the
  /// store reports (unreachable, missing collection, malformed rows) as
  /// `CorpusUnavailable` for this corpus.
  pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedMatch>> {
    if top_k == 0 {
      return Ok(Vec::new());
    }

    let embedding = self.embedder.embed(query).await?;

    let collection = self.corpus.collection_name();
    let rows = self
      .store
      .query(collection, &embedding, top_k)
      .await
      .and_then(|result| result.into_rows())
      .map_err(|e| PipelineError::corpus_unavailable(self.corpus, format!("{e:#}")))?;

    let matches: Vec<RetrievedMatch> = rows
      .into_iter()
      .take(top_k)
      .map(|(id, metadata, distance)| RetrievedMatch::new(self.corpus, id, &metadata, distance))
      .collect();

    tracing::debug!(corpus = %self.corpus, matches = matches.len(), "corpus search finished");
    Ok(matches)
  }
}
