use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

impl Role {
  /// Speaker label used when a turn is quoted inside a prompt
  pub fn speaker(&self) -> &'static str {
    match self {
      Role::User => "Student",
      Role::Assistant => "Advisor",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
  pub role: Role,
  pub content: String,
}

impl ConversationTurn {
  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self { role: Role::Assistant, content: content.into() }
  }
}

/// Append-only record of one session's exchanges.
///
/// Every turn is kept; prompts only ever see a recent window of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
  turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, turn: ConversationTurn) {
    self.turns.push(turn);
  }

  pub fn push_user(&mut self, content: impl Into<String>) {
    self.push(ConversationTurn::user(content));
  }

  pub fn push_assistant(&mut self, content: impl Into<String>) {
    self.push(ConversationTurn::assistant(content));
  }

  pub fn turns(&self) -> &[ConversationTurn] {
    &self.turns
  }

  /// The last `n` turns, oldest first
  pub fn recent(&self, n: usize) -> &[ConversationTurn] {
    let start = self.turns.len().saturating_sub(n);
    &self.turns[start..]
  }

  pub fn last(&self) -> Option<&ConversationTurn> {
    self.turns.last()
  }

  pub fn len(&self) -> usize {
    self.turns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.turns.is_empty()
  }
}

impl FromIterator<ConversationTurn> for ConversationHistory {
  fn from_iter<I: IntoIterator<Item = ConversationTurn>>(iter: I) -> Self {
    Self { turns: iter.into_iter().collect() }
  }
}
