//! Vector store abstraction
//!
//! The pipeline only reads from the store. Writes happen when a corpus is
//! (re)indexed, which always drops and recreates the whole collection.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::RawMetadata;

/// Nearest-neighbor hits for one query embedding, ascending by distance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
  pub ids: Vec<String>,
  pub metadatas: Vec<RawMetadata>,
  pub distances: Vec<f64>,
}

impl QueryResult {
  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  /// Zip the parallel columns into rows, rejecting ragged results
  pub fn into_rows(self) -> Result<Vec<(String, RawMetadata, f64)>> {
    if self.metadatas.len() != self.ids.len() || self.distances.len() != self.ids.len() {
      return Err(anyhow!(
        "Malformed query result: {} ids, {} metadatas, {} distances",
        self.ids.len(),
        self.metadatas.len(),
        self.distances.len()
      ));
    }

    Ok(
      self
        .ids
        .into_iter()
        .zip(self.metadatas)
        .zip(self.distances)
        .map(|((id, metadata), distance)| (id, metadata, distance))
        .collect(),
    )
  }
}

/// Collections of (id, embedding, metadata) with k-nearest-neighbor lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
  /// Insert or replace every record; the three slices are parallel
  async fn upsert_all(
    &self,
    collection: &str,
    ids: &[String],
    embeddings: &[Vec<f32>],
    metadatas: &[RawMetadata],
  ) -> Result<()>;

  /// Up to `k` nearest records, ascending by distance. Fails when the
  /// collection does not exist; an empty collection yields no rows.
  async fn query(&self, collection: &str, embedding: &[f32], k: usize) -> Result<QueryResult>;

  /// Remove a collection. Absence is not an error.
  async fn drop_collection(&self, collection: &str) -> Result<()>;

  /// Number of records in a collection
  async fn count(&self, collection: &str) -> Result<usize>;

  /// Make previous writes durable, where the backend needs it
  async fn flush(&self) -> Result<()> {
    Ok(())
  }
}

/// Check the parallel slices handed to `upsert_all` line up
pub fn validate_upsert(ids: &[String], embeddings: &[Vec<f32>], metadatas: &[RawMetadata]) -> Result<()> {
  if ids.len() != embeddings.len() || ids.len() != metadatas.len() {
    return Err(anyhow!(
      "Upsert needs parallel inputs: {} ids, {} embeddings, {} metadatas",
      ids.len(),
      embeddings.len(),
      metadatas.len()
    ));
  }

  if let Some(first) = embeddings.first() {
    if first.is_empty() {
      return Err(anyhow!("Embeddings must not be empty"));
    }
    if let Some(bad) = embeddings.iter().position(|e| e.len() != first.len()) {
      return Err(anyhow!(
        "Embedding for '{}' has dimension {}, expected {}",
        ids[bad],
        embeddings[bad].len(),
        first.len()
      ));
    }
  }

  Ok(())
}
