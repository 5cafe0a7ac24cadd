use std::sync::Arc;

use crate::models::{ConversationHistory, RetrievedMatch};
use crate::pipeline::prompts;
use crate::services::TextGenerator;
use crate::Result;

/// Writes the closing advisor narrative over the three explained lists
pub struct ResponseSynthesizer {
  generator: Arc<dyn TextGenerator>,
  history_turns: usize,
  listing_limit: usize,
}

impl ResponseSynthesizer {
  pub fn new(generator: Arc<dyn TextGenerator>, history_turns: usize, listing_limit: usize) -> Self {
    Self { generator, history_turns, listing_limit }
  }

  pub async fn synthesize(
    &self,
    goal: &str,
    courses: &[RetrievedMatch],
    faculty: &[RetrievedMatch],
    events: &[RetrievedMatch],
    history: &ConversationHistory,
  ) -> Result<String> {
    let messages = prompts::synthesis_messages(
      goal,
      courses,
      faculty,
      events,
      history.recent(self.history_turns),
      self.listing_limit,
    );
    let narrative = self.generator.chat(&messages).await?;
    Ok(narrative.trim().to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::PipelineError;
  use crate::services::generation::MockTextGenerator;
  use crate::services::ChatRole;

  #[tokio::test]
  async fn test_synthesis_with_empty_lists_still_runs() {
    let mut generator = MockTextGenerator::new();
    generator
      .expect_chat()
      .withf(|messages| {
        messages.len() == 2
          && messages[0].role == ChatRole::System
          && messages[1].content.contains("No matching courses found.")
          && messages[1].content.contains("No matching events found.")
      })
      .times(1)
      .returning(|_| Ok("\nNothing matched yet; try telling me more about the goal.\n".to_string()));

    let synthesizer = ResponseSynthesizer::new(Arc::new(generator), 4, 5);
    let narrative =
      synthesizer.synthesize("learn glassblowing", &[], &[], &[], &ConversationHistory::new()).await.unwrap();
    assert_eq!(narrative, "Nothing matched yet; try telling me more about the goal.");
  }

  #[tokio::test]
  async fn test_history_window_is_limited() {
    let history: ConversationHistory = (0..10)
      .map(|i| crate::models::ConversationTurn::user(format!("message {i}")))
      .collect();

    let mut generator = MockTextGenerator::new();
    generator
      .expect_chat()
      .withf(|messages| messages.len() == 6 && messages[1].content == "message 6")
      .returning(|_| Ok("ok".to_string()));

    let synthesizer = ResponseSynthesizer::new(Arc::new(generator), 4, 5);
    synthesizer.synthesize("goal", &[], &[], &[], &history).await.unwrap();
  }

  #[tokio::test]
  async fn test_generation_failure_propagates() {
    let mut generator = MockTextGenerator::new();
    generator.expect_chat().returning(|_| Err(PipelineError::generation_unavailable("down")));

    let synthesizer = ResponseSynthesizer::new(Arc::new(generator), 4, 5);
    let result = synthesizer.synthesize("goal", &[], &[], &[], &ConversationHistory::new()).await;
    assert!(matches!(result, Err(PipelineError::GenerationUnavailable { .. })));
  }
}
