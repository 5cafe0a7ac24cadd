//! In-process vector store with optional JSON snapshot persistence
//!
//! Exact nearest-neighbor search by squared Euclidean distance, the same
//! default space the hosted store uses, so distances read the same whichever
//! backend answered.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::models::RawMetadata;
use crate::services::vector_database::{validate_upsert, QueryResult, VectorStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
  embedding: Vec<f32>,
  metadata: RawMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Collection {
  /// Fixed by the first upsert
  dimension: Option<usize>,
  entries: BTreeMap<String, StoredEntry>,
}

pub struct InMemoryVectorStore {
  collections: RwLock<BTreeMap<String, Collection>>,
  snapshot_path: Option<PathBuf>,
}

impl Default for InMemoryVectorStore {
  fn default() -> Self {
    Self::new()
  }
}

impl InMemoryVectorStore {
  /// Volatile store, lost when dropped
  pub fn new() -> Self {
    Self { collections: RwLock::new(BTreeMap::new()), snapshot_path: None }
  }

  /// Store backed by a snapshot file, loaded now if it exists and written on `flush`
  pub async fn with_snapshot(path: PathBuf) -> Result<Self> {
    let exists = tokio::fs::try_exists(&path)
      .await
      .with_context(|| format!("Failed to check snapshot {}", path.display()))?;
    let collections = if exists { load_snapshot(&path).await? } else { BTreeMap::new() };

    tracing::debug!(path = %path.display(), collections = collections.len(), "opened vector snapshot");
    Ok(Self { collections: RwLock::new(collections), snapshot_path: Some(path) })
  }

  pub async fn collection_names(&self) -> Vec<String> {
    self.collections.read().await.keys().cloned().collect()
  }

  /// Write the current contents to `path`
  pub async fn save_snapshot(&self, path: &Path) -> Result<()> {
    let json = serde_json::to_string(&*self.collections.read().await)?;

    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("Failed to create snapshot directory {}", parent.display()))?;
    }
    tokio::fs::write(path, json)
      .await
      .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    Ok(())
  }
}

async fn load_snapshot(path: &Path) -> Result<BTreeMap<String, Collection>> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
  serde_json::from_str(&content).map_err(|e| anyhow!("Invalid snapshot {}: {}", path.display(), e))
}

/// Squared Euclidean distance
fn squared_l2(a: &[f32], b: &[f32]) -> f64 {
  a.iter()
    .zip(b.iter())
    .map(|(x, y)| {
      let diff = f64::from(*x) - f64::from(*y);
      diff * diff
    })
    .sum()
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
  async fn upsert_all(
    &self,
    collection: &str,
    ids: &[String],
    embeddings: &[Vec<f32>],
    metadatas: &[RawMetadata],
  ) -> Result<()> {
    validate_upsert(ids, embeddings, metadatas)?;

    let mut collections = self.collections.write().await;
    let target = collections.entry(collection.to_string()).or_default();

    if let (Some(expected), Some(first)) = (target.dimension, embeddings.first()) {
      if first.len() != expected {
        return Err(anyhow!(
          "Collection '{}' holds {}-dimensional embeddings, got {}",
          collection,
          expected,
          first.len()
        ));
      }
    }

    if let Some(first) = embeddings.first() {
      target.dimension = Some(first.len());
    }

    for ((id, embedding), metadata) in ids.iter().zip(embeddings).zip(metadatas) {
      target
        .entries
        .insert(id.clone(), StoredEntry { embedding: embedding.clone(), metadata: metadata.clone() });
    }

    Ok(())
  }

  async fn query(&self, collection: &str, embedding: &[f32], k: usize) -> Result<QueryResult> {
    let collections = self.collections.read().await;
    let target =
      collections.get(collection).ok_or_else(|| anyhow!("Collection '{}' does not exist", collection))?;

    if let Some(expected) = target.dimension {
      if embedding.len() != expected {
        return Err(anyhow!(
          "Query embedding has dimension {}, collection '{}' expects {}",
          embedding.len(),
          collection,
          expected
        ));
      }
    }

    let mut scored: Vec<(&String, &StoredEntry, f64)> = target
      .entries
      .iter()
      .map(|(id, entry)| (id, entry, squared_l2(&entry.embedding, embedding)))
      .collect();

    // Ties fall back to id order so identical queries give identical lists
    scored.sort_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(b.0)));
    scored.truncate(k);

    let mut result = QueryResult::default();
    for (id, entry, distance) in scored {
      result.ids.push(id.clone());
      result.metadatas.push(entry.metadata.clone());
      result.distances.push(distance);
    }
    Ok(result)
  }

  async fn drop_collection(&self, collection: &str) -> Result<()> {
    self.collections.write().await.remove(collection);
    Ok(())
  }

  async fn count(&self, collection: &str) -> Result<usize> {
    self
      .collections
      .read()
      .await
      .get(collection)
      .map(|c| c.entries.len())
      .ok_or_else(|| anyhow!("Collection '{}' does not exist", collection))
  }

  async fn flush(&self) -> Result<()> {
    match &self.snapshot_path {
      Some(path) => self.save_snapshot(path).await,
      None => Ok(()),
    }
  }
}
