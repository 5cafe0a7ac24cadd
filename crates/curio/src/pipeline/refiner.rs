use std::sync::Arc;

use crate::models::ConversationHistory;
use crate::pipeline::prompts;
use crate::services::TextGenerator;
use crate::Result;

/// Keyword queries are short; anything past this is noise
const REFINE_MAX_TOKENS: u32 = 32;

/// Turns a free-text goal into a compact retrieval query
pub struct QueryRefiner {
  generator: Arc<dyn TextGenerator>,
  history_turns: usize,
}

impl QueryRefiner {
  pub fn new(generator: Arc<dyn TextGenerator>, history_turns: usize) -> Self {
    Self { generator, history_turns }
  }

  /// The model's answer, trimmed and otherwise passed through as-is
  pub async fn refine(&self, goal: &str, history: &ConversationHistory) -> Result<String> {
    let prompt = prompts::refine_prompt(goal, history.recent(self.history_turns));
    let completion = self.generator.complete(&prompt, Some(REFINE_MAX_TOKENS)).await?;
    let query = completion.trim().to_string();

    tracing::debug!(%query, "refined goal into search query");
    Ok(query)
  }
}
