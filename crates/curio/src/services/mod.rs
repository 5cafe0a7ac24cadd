//! External collaborators of the pipeline and their adapters
//!
//! Each collaborator is a trait so stages can be exercised against fakes;
//! the adapters here talk to Ollama, Chroma, or keep vectors in memory.

pub mod chroma;
pub mod embeddings;
pub mod generation;
pub mod http;
pub mod memory_store;
pub mod ollama;
pub mod vector_database;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{CurioConfig, StoreBackend};

pub use chroma::ChromaVectorStore;
pub use embeddings::EmbeddingProvider;
pub use generation::{ChatMessage, ChatRole, TextGenerator};
pub use memory_store::InMemoryVectorStore;
pub use ollama::OllamaClient;
pub use vector_database::{QueryResult, VectorStore};

/// Open the vector store selected by the configuration
pub async fn open_store(config: &CurioConfig) -> Result<Arc<dyn VectorStore>> {
  match config.store.backend {
    StoreBackend::Memory => {
      let path = config.store.snapshot_path()?;
      let store = InMemoryVectorStore::with_snapshot(path).await?;
      Ok(Arc::new(store))
    }
    StoreBackend::Chroma => {
      let store = ChromaVectorStore::new(&config.store.chroma_url, config.store.timeout_secs)?;
      Ok(Arc::new(store))
    }
  }
}
