use serde::{Deserialize, Serialize};

use crate::models::{Corpus, ItemMetadata, RawMetadata};

/// A retrieved item: its metadata, how close it was, and why it matters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMatch {
  pub id: String,
  #[serde(flatten)]
  pub metadata: ItemMetadata,
  /// Lower is more similar, rounded to 4 decimals
  pub distance: f64,
  /// Empty until the explanation fan-out fills it; stays empty when that fails
  #[serde(default)]
  pub explanation: String,
}

impl RetrievedMatch {
  pub fn new(corpus: Corpus, id: impl Into<String>, raw: &RawMetadata, distance: f64) -> Self {
    Self {
      id: id.into(),
      metadata: ItemMetadata::from_raw(corpus, raw),
      distance: round_distance(distance),
      explanation: String::new(),
    }
  }

  pub fn corpus(&self) -> Corpus {
    self.metadata.corpus()
  }

  pub fn title(&self) -> &str {
    self.metadata.title().unwrap_or("(untitled)")
  }

  pub fn has_explanation(&self) -> bool {
    !self.explanation.is_empty()
  }
}

/// Round a distance to 4 decimal places; negative noise from the store clamps to zero
pub fn round_distance(distance: f64) -> f64 {
  ((distance.max(0.0)) * 10_000.0).round() / 10_000.0
}
