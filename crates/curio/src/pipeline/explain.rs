//! Per-item explanation fan-out
//!
//! Every retrieved item gets its own generation call. Calls run as
//! independent tasks gated by a semaphore, and each result lands in a slot
//! indexed by the item's position, so completion order never affects where
//! an explanation ends up. A call that fails or panics leaves only that
//! item's explanation empty.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::{ConversationHistory, RetrievedMatch};
use crate::pipeline::prompts;
use crate::services::TextGenerator;
use crate::Result;

const EXPLANATION_MAX_TOKENS: u32 = 120;

/// Counts from one fan-out run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
  pub total: usize,
  pub succeeded: usize,
  /// Items left without an explanation
  pub failed: usize,
}

pub struct ExplanationFanOut {
  generator: Arc<dyn TextGenerator>,
  history_turns: usize,
  max_concurrency: usize,
  retries: usize,
}

impl ExplanationFanOut {
  pub fn new(generator: Arc<dyn TextGenerator>, history_turns: usize, max_concurrency: usize) -> Self {
    Self { generator, history_turns, max_concurrency: max_concurrency.max(1), retries: 0 }
  }

  /// Extra attempts per item after a failed call
  pub fn with_retries(mut self, retries: usize) -> Self {
    self.retries = retries;
    self
  }

  pub fn max_concurrency(&self) -> usize {
    self.max_concurrency
  }

  /// Fill `explanation` on every item of the three lists in place.
  ///
  /// Never fails as a whole. List lengths and order are preserved.
  pub async fn explain_all(
    &self,
    courses: &mut [RetrievedMatch],
    faculty: &mut [RetrievedMatch],
    events: &mut [RetrievedMatch],
    goal: &str,
    history: &ConversationHistory,
  ) -> FanOutReport {
    let window = history.recent(self.history_turns);
    let prompts: Vec<String> = courses
      .iter()
      .chain(faculty.iter())
      .chain(events.iter())
      .map(|item| prompts::explanation_prompt(item, goal, window))
      .collect();

    let total = prompts.len();
    if total == 0 {
      return FanOutReport::default();
    }

    let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
    let mut tasks = JoinSet::new();

    for (index, prompt) in prompts.into_iter().enumerate() {
      let generator = Arc::clone(&self.generator);
      let semaphore = Arc::clone(&semaphore);
      let retries = self.retries;

      tasks.spawn(async move {
        // Held until the task finishes; the semaphore is never closed
        let _permit = semaphore.acquire_owned().await;
        (index, explain_one(generator.as_ref(), &prompt, retries).await)
      });
    }

    let mut slots: Vec<Option<String>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok((index, Ok(text))) => slots[index] = Some(text),
        Ok((index, Err(e))) => tracing::warn!(item = index, error = %e, "explanation failed"),
        Err(e) => tracing::warn!(error = %e, "explanation task aborted"),
      }
    }

    let mut report = FanOutReport { total, ..Default::default() };
    let items = courses.iter_mut().chain(faculty.iter_mut()).chain(events.iter_mut());
    for (item, slot) in items.zip(slots) {
      match slot {
        Some(text) if !text.is_empty() => {
          item.explanation = text;
          report.succeeded += 1;
        }
        _ => {
          item.explanation = String::new();
          report.failed += 1;
        }
      }
    }

    tracing::debug!(total, succeeded = report.succeeded, failed = report.failed, "explanations merged");
    report
  }
}

async fn explain_one(generator: &dyn TextGenerator, prompt: &str, retries: usize) -> Result<String> {
  let mut attempt = 0;
  loop {
    match generator.complete(prompt, Some(EXPLANATION_MAX_TOKENS)).await {
      Ok(text) => return Ok(text.trim().to_string()),
      Err(e) if attempt < retries => {
        attempt += 1;
        tracing::debug!(attempt, error = %e, "retrying explanation");
      }
      Err(e) => return Err(e),
    }
  }
}
