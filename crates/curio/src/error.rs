//! Error taxonomy for the retrieval-and-explanation pipeline

use thiserror::Error;

use crate::models::Corpus;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
  #[error("Text generation unavailable: {message}")]
  GenerationUnavailable { message: String },

  #[error("The {corpus} search is unavailable: {message}")]
  CorpusUnavailable { corpus: Corpus, message: String },

  #[error("Embedding unavailable: {message}")]
  EmbeddingUnavailable { message: String },

  #[error("Learning goal must not be empty")]
  EmptyGoal,

  #[error("Invalid configuration: {message}")]
  Config { message: String },

  #[error("Indexing failed: {message}")]
  Indexing { message: String },
}

impl PipelineError {
  pub fn generation_unavailable(message: impl Into<String>) -> Self {
    Self::GenerationUnavailable { message: message.into() }
  }

  pub fn corpus_unavailable(corpus: Corpus, message: impl Into<String>) -> Self {
    Self::CorpusUnavailable { corpus, message: message.into() }
  }

  pub fn embedding_unavailable(message: impl Into<String>) -> Self {
    Self::EmbeddingUnavailable { message: message.into() }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  pub fn indexing(message: impl Into<String>) -> Self {
    Self::Indexing { message: message.into() }
  }

  /// Whether the orchestrator can absorb this failure by degrading a corpus
  /// to an empty result instead of failing the submission.
  pub fn is_degradable(&self) -> bool {
    matches!(self, Self::CorpusUnavailable { .. } | Self::EmbeddingUnavailable { .. })
  }
}
