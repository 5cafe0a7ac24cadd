//! Embedding provider interface

use async_trait::async_trait;

use crate::Result;

/// Turns text into a fixed-length vector.
///
/// The same provider (and model) must be used at indexing time and at query
/// time, otherwise distances are meaningless. Failures surface as
/// `PipelineError::EmbeddingUnavailable`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
  async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
