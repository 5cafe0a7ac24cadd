//! Text generation interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{ConversationTurn, Role};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
  System,
  User,
  Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: ChatRole,
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: ChatRole::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: ChatRole::User, content: content.into() }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self { role: ChatRole::Assistant, content: content.into() }
  }
}

impl From<&ConversationTurn> for ChatMessage {
  fn from(turn: &ConversationTurn) -> Self {
    match turn.role {
      Role::User => ChatMessage::user(turn.content.clone()),
      Role::Assistant => ChatMessage::assistant(turn.content.clone()),
    }
  }
}

/// Produces natural-language completions.
///
/// Failures surface as `PipelineError::GenerationUnavailable`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
  /// Stateless single-turn completion
  async fn complete(&self, prompt: &str, max_tokens: Option<u32>) -> Result<String>;

  /// Multi-turn completion over a framed conversation
  async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}
