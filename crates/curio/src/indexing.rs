//! Rebuilding a corpus collection from normalized JSONL records
//!
//! Each non-blank line is `{"id"?, "document", "metadata"}`. Every document
//! is embedded before the collection is touched, so a bad file or an
//! unreachable embedding service leaves the previous collection in place.

use futures::{stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

use crate::error::PipelineError;
use crate::models::{raw_from_json, Corpus, RawMetadata};
use crate::services::{EmbeddingProvider, VectorStore};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexRecord {
  #[serde(default)]
  pub id: Option<String>,
  pub document: String,
  #[serde(default)]
  pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
  pub corpus: Corpus,
  pub records: usize,
}

/// Parse JSONL content, skipping blank lines
pub fn parse_records(content: &str) -> Result<Vec<IndexRecord>> {
  let mut records = Vec::new();

  for (line_number, line) in content.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }

    let record: IndexRecord = serde_json::from_str(line)
      .map_err(|e| PipelineError::indexing(format!("line {}: {}", line_number + 1, e)))?;

    if record.document.trim().is_empty() {
      return Err(PipelineError::indexing(format!("line {}: document is blank", line_number + 1)));
    }
    records.push(record);
  }

  Ok(records)
}

pub async fn load_records(path: &Path) -> Result<Vec<IndexRecord>> {
  let content = tokio::fs::read_to_string(path)
    .await
    .map_err(|e| PipelineError::indexing(format!("Cannot read {}: {}", path.display(), e)))?;
  parse_records(&content)
}

/// Explicit ids where given, otherwise the record's position
fn assign_ids(records: &[IndexRecord]) -> Result<Vec<String>> {
  let ids: Vec<String> = records
    .iter()
    .enumerate()
    .map(|(ordinal, record)| record.id.clone().unwrap_or_else(|| ordinal.to_string()))
    .collect();

  let mut seen = HashSet::new();
  for id in &ids {
    if !seen.insert(id.as_str()) {
      return Err(PipelineError::indexing(format!("duplicate id '{id}'")));
    }
  }
  Ok(ids)
}

/// Replace the corpus collection with `records`
pub async fn index_corpus(
  corpus: Corpus,
  records: &[IndexRecord],
  embedder: &dyn EmbeddingProvider,
  store: &dyn VectorStore,
  concurrency: usize,
) -> Result<IndexReport> {
  let ids = assign_ids(records)?;
  let metadatas: Vec<RawMetadata> = records.iter().map(|r| raw_from_json(r.metadata.clone())).collect();

  tracing::info!(%corpus, records = records.len(), "embedding documents");
  let embeddings: Vec<Vec<f32>> = stream::iter(records)
    .map(|record| embedder.embed(&record.document))
    .buffered(concurrency.max(1))
    .try_collect()
    .await?;

  let collection = corpus.collection_name();
  store
    .drop_collection(collection)
    .await
    .map_err(|e| PipelineError::indexing(format!("Dropping '{collection}': {e:#}")))?;
  store
    .upsert_all(collection, &ids, &embeddings, &metadatas)
    .await
    .map_err(|e| PipelineError::indexing(format!("Writing '{collection}': {e:#}")))?;
  store
    .flush()
    .await
    .map_err(|e| PipelineError::indexing(format!("Persisting '{collection}': {e:#}")))?;

  tracing::info!(%corpus, records = records.len(), "collection rebuilt");
  Ok(IndexReport { corpus, records: records.len() })
}
