//! Chroma REST adapter for the vector store interface

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::models::{raw_from_json, RawMetadata};
use crate::services::http::{build_client, endpoint, ensure_success, parse_base_url};
use crate::services::vector_database::{validate_upsert, QueryResult, VectorStore};

const COLLECTIONS_PATH: &str = "api/v1/collections";

pub struct ChromaVectorStore {
  client: Client,
  base_url: Url,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
  id: String,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
  name: &'a str,
  get_or_create: bool,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
  ids: &'a [String],
  embeddings: &'a [Vec<f32>],
  /// Chroma rejects empty metadata objects, so those rows go out as null
  metadatas: Vec<Option<&'a RawMetadata>>,
}

impl<'a> UpsertRequest<'a> {
  fn new(ids: &'a [String], embeddings: &'a [Vec<f32>], metadatas: &'a [RawMetadata]) -> Self {
    let metadatas = metadatas.iter().map(|metadata| (!metadata.is_empty()).then_some(metadata)).collect();
    Self { ids, embeddings, metadatas }
  }
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
  query_embeddings: [&'a [f32]; 1],
  n_results: usize,
  include: [&'static str; 2],
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
  ids: Vec<Vec<String>>,
  #[serde(default)]
  metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
  #[serde(default)]
  distances: Option<Vec<Vec<f64>>>,
}

impl ChromaVectorStore {
  pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
    Ok(Self { client: build_client(timeout_secs)?, base_url: parse_base_url(base_url)? })
  }

  fn collections_url(&self, suffix: &str) -> Result<Url> {
    if suffix.is_empty() {
      endpoint(&self.base_url, COLLECTIONS_PATH)
    } else {
      endpoint(&self.base_url, &format!("{COLLECTIONS_PATH}/{suffix}"))
    }
  }

  /// Look up a collection id by name; `None` when the collection does not exist
  async fn find_collection(&self, name: &str) -> Result<Option<String>> {
    let response = self.client.get(self.collections_url(name)?).send().await?;
    let status = response.status();

    if status.is_success() {
      let info: CollectionInfo = response.json().await?;
      return Ok(Some(info.id));
    }

    let body = response.text().await.unwrap_or_default();
    if is_missing_collection(status, &body) {
      return Ok(None);
    }
    Err(anyhow!("Looking up collection '{}' failed with {}: {}", name, status, body.trim()))
  }

  async fn require_collection(&self, name: &str) -> Result<String> {
    self.find_collection(name).await?.ok_or_else(|| anyhow!("Collection '{}' does not exist", name))
  }

  async fn get_or_create_collection(&self, name: &str) -> Result<String> {
    let request = CreateCollectionRequest { name, get_or_create: true };
    let response = self.client.post(self.collections_url("")?).json(&request).send().await?;
    let info: CollectionInfo = ensure_success(response, "Creating collection").await?.json().await?;
    Ok(info.id)
  }

  async fn count_by_id(&self, id: &str) -> Result<usize> {
    let response = self.client.get(self.collections_url(&format!("{id}/count"))?).send().await?;
    let count: usize = ensure_success(response, "Counting collection").await?.json().await?;
    Ok(count)
  }
}

/// Chroma reports a missing collection as 404 on newer servers and as a
/// 4xx/5xx "does not exist" error on older ones
fn is_missing_collection(status: StatusCode, body: &str) -> bool {
  status == StatusCode::NOT_FOUND || body.contains("does not exist")
}

fn to_raw_metadata(metadata: Option<Map<String, Value>>) -> RawMetadata {
  raw_from_json(metadata.unwrap_or_default())
}

fn into_query_result(response: QueryResponse) -> QueryResult {
  let ids = response.ids.into_iter().next().unwrap_or_default();
  let metadatas = response
    .metadatas
    .and_then(|rows| rows.into_iter().next())
    .map(|row| row.into_iter().map(to_raw_metadata).collect())
    .unwrap_or_default();
  let distances =
    response.distances.and_then(|rows| rows.into_iter().next()).unwrap_or_default();

  QueryResult { ids, metadatas, distances }
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
  async fn upsert_all(
    &self,
    collection: &str,
    ids: &[String],
    embeddings: &[Vec<f32>],
    metadatas: &[RawMetadata],
  ) -> Result<()> {
    validate_upsert(ids, embeddings, metadatas)?;
    let id = self.get_or_create_collection(collection).await?;

    if ids.is_empty() {
      return Ok(());
    }

    let request = UpsertRequest::new(ids, embeddings, metadatas);
    let response =
      self.client.post(self.collections_url(&format!("{id}/upsert"))?).json(&request).send().await?;
    ensure_success(response, "Upserting records").await?;
    Ok(())
  }

  async fn query(&self, collection: &str, embedding: &[f32], k: usize) -> Result<QueryResult> {
    let id = self.require_collection(collection).await?;

    // Older servers reject n_results above the collection size
    let available = self.count_by_id(&id).await?;
    let n_results = k.min(available);
    if n_results == 0 {
      return Ok(QueryResult::default());
    }

    let request =
      QueryRequest { query_embeddings: [embedding], n_results, include: ["metadatas", "distances"] };
    let response =
      self.client.post(self.collections_url(&format!("{id}/query"))?).json(&request).send().await?;
    let response: QueryResponse = ensure_success(response, "Querying collection").await?.json().await?;

    Ok(into_query_result(response))
  }

  async fn drop_collection(&self, collection: &str) -> Result<()> {
    if self.find_collection(collection).await?.is_none() {
      return Ok(());
    }

    let response = self.client.delete(self.collections_url(collection)?).send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    if is_missing_collection(status, &body) {
      return Ok(());
    }
    Err(anyhow!("Dropping collection '{}' failed with {}: {}", collection, status, body.trim()))
  }

  async fn count(&self, collection: &str) -> Result<usize> {
    let id = self.require_collection(collection).await?;
    self.count_by_id(&id).await
  }
}
