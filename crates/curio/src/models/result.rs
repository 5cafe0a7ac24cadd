use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Corpus, RetrievedMatch};

/// Everything one goal submission produced.
///
/// Replaced wholesale by the next submission, never merged into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
  pub submission_id: Uuid,
  pub courses: Vec<RetrievedMatch>,
  pub faculty: Vec<RetrievedMatch>,
  pub events: Vec<RetrievedMatch>,
  pub narrative: String,
  /// Corpora whose search failed and were treated as empty
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub degraded: Vec<Corpus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineResult {
  /// Empty result for a submission that did not complete
  pub fn empty(submission_id: Uuid) -> Self {
    Self { submission_id, ..Default::default() }
  }

  pub fn matches(&self, corpus: Corpus) -> &[RetrievedMatch] {
    match corpus {
      Corpus::Course => &self.courses,
      Corpus::Faculty => &self.faculty,
      Corpus::Event => &self.events,
    }
  }

  pub fn total_matches(&self) -> usize {
    self.courses.len() + self.faculty.len() + self.events.len()
  }

  pub fn is_empty(&self) -> bool {
    self.total_matches() == 0 && self.narrative.is_empty()
  }
}
