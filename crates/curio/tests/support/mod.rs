#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use curio::indexing::{index_corpus, IndexRecord};
use curio::models::{Corpus, RawMetadata};
use curio::services::{
  ChatMessage, EmbeddingProvider, InMemoryVectorStore, QueryResult, TextGenerator, VectorStore,
};
use curio::{PipelineError, Result};

/// Bag-of-words embedder over a fixed vocabulary, normalized to unit length
pub struct KeywordEmbedder {
  vocabulary: Vec<&'static str>,
}

pub const VOCABULARY: &[&str] = &[
  "behavioral",
  "economics",
  "decision",
  "making",
  "judgment",
  "uncertainty",
  "financial",
  "accounting",
  "markets",
  "pricing",
  "career",
  "networking",
  "hackathon",
  "machine",
  "learning",
];

impl KeywordEmbedder {
  pub fn new() -> Self {
    Self { vocabulary: VOCABULARY.to_vec() }
  }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split(|c: char| !c.is_alphanumeric()).collect();

    let mut vector: Vec<f32> = self
      .vocabulary
      .iter()
      .map(|term| words.iter().filter(|word| *word == term).count() as f32)
      .collect();

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
      vector.iter_mut().for_each(|v| *v /= norm);
    }
    Ok(vector)
  }
}

pub struct DownEmbedder;

#[async_trait]
impl EmbeddingProvider for DownEmbedder {
  async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
    Err(PipelineError::embedding_unavailable("connection refused"))
  }
}

/// Generator with canned answers that records every request it sees
pub struct ScriptedGenerator {
  pub query: String,
  pub narrative: String,
  pub fail_refine: bool,
  pub fail_synthesis: bool,
  /// Explanation prompts containing any of these fail
  pub fail_markers: Vec<String>,
  /// Explanation calls with these 1-based call numbers fail
  pub fail_calls: HashSet<usize>,
  pub delay: Duration,
  calls: AtomicUsize,
  in_flight: AtomicUsize,
  peak: AtomicUsize,
  pub prompts: Mutex<Vec<String>>,
  pub chats: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGenerator {
  pub fn new(query: &str) -> Self {
    Self {
      query: query.to_string(),
      narrative: "These picks build a path toward your goal. Want to narrow it down?".to_string(),
      fail_refine: false,
      fail_synthesis: false,
      fail_markers: Vec::new(),
      fail_calls: HashSet::new(),
      delay: Duration::ZERO,
      calls: AtomicUsize::new(0),
      in_flight: AtomicUsize::new(0),
      peak: AtomicUsize::new(0),
      prompts: Mutex::new(Vec::new()),
      chats: Mutex::new(Vec::new()),
    }
  }

  /// Highest number of explanation calls seen running at once
  pub fn peak_concurrency(&self) -> usize {
    self.peak.load(Ordering::SeqCst)
  }

  pub fn explanation_calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn refine_prompts(&self) -> Vec<String> {
    let prompts = self.prompts.lock().unwrap();
    prompts.iter().filter(|p| is_refine_prompt(p)).cloned().collect()
  }

  pub fn last_chat(&self) -> Option<Vec<ChatMessage>> {
    self.chats.lock().unwrap().last().cloned()
  }
}

fn is_refine_prompt(prompt: &str) -> bool {
  prompt.trim_end().ends_with("Search query:")
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
  async fn complete(&self, prompt: &str, _max_tokens: Option<u32>) -> Result<String> {
    self.prompts.lock().unwrap().push(prompt.to_string());

    if is_refine_prompt(prompt) {
      if self.fail_refine {
        return Err(PipelineError::generation_unavailable("Connection refused (os error 111)"));
      }
      return Ok(format!("  {}\n", self.query));
    }

    let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
    let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak.fetch_max(running, Ordering::SeqCst);

    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    self.in_flight.fetch_sub(1, Ordering::SeqCst);

    if self.fail_calls.contains(&call) || self.fail_markers.iter().any(|m| prompt.contains(m.as_str())) {
      return Err(PipelineError::generation_unavailable("model overloaded"));
    }
    Ok(format!("Explanation #{call} ties this to the goal."))
  }

  async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
    self.chats.lock().unwrap().push(messages.to_vec());
    if self.fail_synthesis {
      return Err(PipelineError::generation_unavailable("model crashed"));
    }
    Ok(self.narrative.clone())
  }
}

/// In-memory store whose queries fail for the named collections
pub struct FlakyStore {
  inner: InMemoryVectorStore,
  broken: Vec<&'static str>,
}

impl FlakyStore {
  pub fn new(inner: InMemoryVectorStore, broken: Vec<&'static str>) -> Self {
    Self { inner, broken }
  }
}

#[async_trait]
impl VectorStore for FlakyStore {
  async fn upsert_all(
    &self,
    collection: &str,
    ids: &[String],
    embeddings: &[Vec<f32>],
    metadatas: &[RawMetadata],
  ) -> anyhow::Result<()> {
    self.inner.upsert_all(collection, ids, embeddings, metadatas).await
  }

  async fn query(&self, collection: &str, embedding: &[f32], k: usize) -> anyhow::Result<QueryResult> {
    if self.broken.iter().any(|broken| *broken == collection) {
      return Err(anyhow!("connection reset while querying '{}'", collection));
    }
    self.inner.query(collection, embedding, k).await
  }

  async fn drop_collection(&self, collection: &str) -> anyhow::Result<()> {
    self.inner.drop_collection(collection).await
  }

  async fn count(&self, collection: &str) -> anyhow::Result<usize> {
    self.inner.count(collection).await
  }
}

pub fn record(document: &str, metadata: &[(&str, &str)]) -> IndexRecord {
  let metadata: Map<String, Value> =
    metadata.iter().map(|(k, v)| (k.to_string(), Value::String(v.to_string()))).collect();
  IndexRecord { id: None, document: document.to_string(), metadata }
}

pub async fn seed(store: &dyn VectorStore, corpus: Corpus, records: &[IndexRecord]) {
  index_corpus(corpus, records, &KeywordEmbedder::new(), store, 4).await.unwrap();
}

pub fn course_records() -> Vec<IndexRecord> {
  vec![
    record(
      "Financial Accounting: balance sheets and reporting",
      &[("course code", "ACCT 101"), ("course description", "Financial Accounting"), ("taught by", "L. Pacioli")],
    ),
    record(
      "Judgment and decision making under uncertainty, behavioral economics",
      &[
        ("course code", "ECON 409"),
        ("course description", "Judgment and decision making under uncertainty"),
        ("taught by", "R. Thaler"),
      ],
    ),
    record(
      "Pricing strategy in competitive markets",
      &[("course code", "MKT 310"), ("course description", "Pricing strategy in competitive markets")],
    ),
  ]
}

pub fn faculty_records() -> Vec<IndexRecord> {
  vec![
    record(
      "Researches behavioral economics and judgment",
      &[("name", "Dana Kahn"), ("titles", "Professor of Economics"), ("bio", "Studies judgment.")],
    ),
    record("Machine learning for markets", &[("name", "Sam Vapnik"), ("titles", "Lecturer")]),
  ]
}

pub fn event_records() -> Vec<IndexRecord> {
  vec![
    record(
      "Behavioral economics reading group on decision making",
      &[("title", "Nudge Reading Group"), ("type", "Discussion")],
    ),
    record("Career networking night", &[("title", "Career Night"), ("type", "Networking")]),
    record("Hackathon on machine learning", &[("title", "ML Hackathon"), ("type", "Competition")]),
  ]
}

/// A memory store holding all three seeded corpora
pub async fn seeded_store() -> InMemoryVectorStore {
  let store = InMemoryVectorStore::new();
  seed(&store, Corpus::Course, &course_records()).await;
  seed(&store, Corpus::Faculty, &faculty_records()).await;
  seed(&store, Corpus::Event, &event_records()).await;
  store
}
