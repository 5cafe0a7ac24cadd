//! Per-goal state machine
//!
//! `Received -> Refining -> Searching -> Explaining -> Synthesizing -> Completed`,
//! with a jump to `Failed` from refining or synthesizing. Corpus search
//! failures degrade that corpus to an empty list and never fail a submission.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::models::{ConversationHistory, Corpus, PipelineResult, RetrievedMatch};
use crate::pipeline::explain::{ExplanationFanOut, FanOutReport};
use crate::pipeline::refiner::QueryRefiner;
use crate::pipeline::search::CorpusSearch;
use crate::pipeline::synthesize::ResponseSynthesizer;
use crate::services::{EmbeddingProvider, TextGenerator, VectorStore};
use crate::Result;

const SERVICE_HINT: &str =
  "Make sure Ollama is running and all three corpora have been indexed with `curio index`.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
  Received,
  Refining,
  Searching,
  Explaining,
  Synthesizing,
  Completed,
  Failed,
}

/// Everything that outlives a single submission.
///
/// Created when a conversation starts and mutated only by [`Pipeline::submit`].
#[derive(Debug, Default)]
pub struct SessionState {
  pub history: ConversationHistory,
  /// Result of the latest submission; emptied when that submission failed
  pub result: PipelineResult,
  /// Terminal state of the latest submission
  pub last_state: Option<PipelineState>,
}

impl SessionState {
  pub fn new() -> Self {
    Self::default()
  }
}

/// Trace of one submission through the state machine
#[derive(Debug, Clone)]
pub struct Submission {
  pub id: Uuid,
  pub state: PipelineState,
  /// Every state visited, in order, starting with `Received`
  pub trail: Vec<PipelineState>,
  pub refined_query: Option<String>,
  pub explanations: FanOutReport,
  /// Why the submission failed, when it did
  pub error: Option<PipelineError>,
}

impl Submission {
  fn new() -> Self {
    let id = Uuid::new_v4();
    tracing::info!(submission = %id, "goal received");
    Self {
      id,
      state: PipelineState::Received,
      trail: vec![PipelineState::Received],
      refined_query: None,
      explanations: FanOutReport::default(),
      error: None,
    }
  }

  fn advance(&mut self, next: PipelineState) {
    tracing::debug!(submission = %self.id, from = ?self.state, to = ?next, "pipeline transition");
    self.state = next;
    self.trail.push(next);
  }

  pub fn is_completed(&self) -> bool {
    self.state == PipelineState::Completed
  }
}

/// The assistant turn recorded when a submission fails
pub fn failure_message(error: &PipelineError) -> String {
  format!("⚠️ Error: {error}\n\n{SERVICE_HINT}")
}

pub struct Pipeline {
  refiner: QueryRefiner,
  courses: CorpusSearch,
  faculty: CorpusSearch,
  events: CorpusSearch,
  explainer: ExplanationFanOut,
  synthesizer: ResponseSynthesizer,
  top_k: usize,
}

impl Pipeline {
  pub fn new(
    config: &PipelineConfig,
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
  ) -> Self {
    let search = |corpus| CorpusSearch::new(corpus, Arc::clone(&embedder), Arc::clone(&store));

    Self {
      refiner: QueryRefiner::new(Arc::clone(&generator), config.refine_history_turns),
      courses: search(Corpus::Course),
      faculty: search(Corpus::Faculty),
      events: search(Corpus::Event),
      explainer: ExplanationFanOut::new(
        Arc::clone(&generator),
        config.prompt_history_turns,
        config.max_concurrency,
      )
      .with_retries(config.explanation_retries),
      synthesizer: ResponseSynthesizer::new(generator, config.prompt_history_turns, config.listing_limit),
      top_k: config.top_k,
    }
  }

  /// Run one goal to a terminal state.
  ///
  /// Only a blank goal is rejected with `Err`, before the session is touched.
  /// Every other outcome, including failure, is recorded in `session` and
  /// described by the returned [`Submission`].
  pub async fn submit(&self, session: &mut SessionState, goal: &str) -> Result<Submission> {
    let goal = goal.trim();
    if goal.is_empty() {
      return Err(PipelineError::EmptyGoal);
    }

    let mut submission = Submission::new();

    // Stages see the conversation as it stood before this goal
    let history = session.history.clone();
    session.history.push_user(goal);

    match self.run(goal, &history, &mut submission).await {
      Ok(result) => {
        session.history.push_assistant(result.narrative.clone());
        session.result = result;
        submission.advance(PipelineState::Completed);
        tracing::info!(submission = %submission.id, matches = session.result.total_matches(), "goal completed");
      }
      Err(error) => {
        tracing::error!(submission = %submission.id, error = %error, "goal failed");
        session.history.push_assistant(failure_message(&error));
        session.result = PipelineResult::empty(submission.id);
        submission.error = Some(error);
        submission.advance(PipelineState::Failed);
      }
    }

    session.last_state = Some(submission.state);
    Ok(submission)
  }

  async fn run(
    &self,
    goal: &str,
    history: &ConversationHistory,
    submission: &mut Submission,
  ) -> Result<PipelineResult> {
    submission.advance(PipelineState::Refining);
    let query = self.refiner.refine(goal, history).await?;
    submission.refined_query = Some(query.clone());

    submission.advance(PipelineState::Searching);
    let (courses, faculty, events) = tokio::join!(
      self.courses.search(&query, self.top_k),
      self.faculty.search(&query, self.top_k),
      self.events.search(&query, self.top_k),
    );

    let mut degraded = Vec::new();
    let mut courses = absorb(self.courses.corpus(), courses, &mut degraded);
    let mut faculty = absorb(self.faculty.corpus(), faculty, &mut degraded);
    let mut events = absorb(self.events.corpus(), events, &mut degraded);

    submission.advance(PipelineState::Explaining);
    submission.explanations =
      self.explainer.explain_all(&mut courses, &mut faculty, &mut events, goal, history).await;

    submission.advance(PipelineState::Synthesizing);
    let narrative = self.synthesizer.synthesize(goal, &courses, &faculty, &events, history).await?;

    Ok(PipelineResult {
      submission_id: submission.id,
      courses,
      faculty,
      events,
      narrative,
      degraded,
      completed_at: Some(Utc::now()),
    })
  }
}

/// A failed corpus search becomes an empty list and is noted as degraded
fn absorb(
  corpus: Corpus,
  outcome: Result<Vec<RetrievedMatch>>,
  degraded: &mut Vec<Corpus>,
) -> Vec<RetrievedMatch> {
  match outcome {
    Ok(matches) => matches,
    Err(error) => {
      tracing::warn!(%corpus, error = %error, "corpus search degraded to empty");
      degraded.push(corpus);
      Vec::new()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::RawMetadata;
  use crate::services::embeddings::MockEmbeddingProvider;
  use crate::services::generation::MockTextGenerator;
  use crate::services::vector_database::MockVectorStore;
  use crate::services::QueryResult;

  fn embedder() -> Arc<MockEmbeddingProvider> {
    let mut embedder = MockEmbeddingProvider::new();
    embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
    Arc::new(embedder)
  }

  fn one_row(key: &str, value: &str) -> QueryResult {
    let metadata: RawMetadata = [(key.to_string(), value.to_string())].into_iter().collect();
    QueryResult { ids: vec!["0".to_string()], metadatas: vec![metadata], distances: vec![0.25] }
  }

  fn healthy_store() -> MockVectorStore {
    let mut store = MockVectorStore::new();
    store.expect_query().returning(|collection, _, _| match collection {
      "courses" => Ok(one_row("course code", "ECON 101")),
      "faculty" => Ok(one_row("name", "Ada")),
      _ => Ok(one_row("title", "Career Fair")),
    });
    store
  }

  fn healthy_generator() -> MockTextGenerator {
    let mut generator = MockTextGenerator::new();
    generator.expect_complete().returning(|prompt, _| {
      if prompt.ends_with("Search query:") {
        Ok("economics".to_string())
      } else {
        Ok("Relevant.".to_string())
      }
    });
    generator.expect_chat().returning(|_| Ok("Here is your path.".to_string()));
    generator
  }

  #[tokio::test]
  async fn test_completed_submission_updates_session() {
    let pipeline =
      Pipeline::new(&PipelineConfig::default(), Arc::new(healthy_generator()), embedder(), Arc::new(healthy_store()));
    let mut session = SessionState::new();

    let submission = pipeline.submit(&mut session, "  learn economics ").await.unwrap();

    assert_eq!(
      submission.trail,
      vec![
        PipelineState::Received,
        PipelineState::Refining,
        PipelineState::Searching,
        PipelineState::Explaining,
        PipelineState::Synthesizing,
        PipelineState::Completed,
      ]
    );
    assert_eq!(submission.refined_query.as_deref(), Some("economics"));
    assert_eq!(submission.explanations.succeeded, 3);
    assert_eq!(session.last_state, Some(PipelineState::Completed));
    assert_eq!(session.result.submission_id, submission.id);
    assert_eq!(session.result.narrative, "Here is your path.");
    assert!(session.result.completed_at.is_some());
    assert_eq!(session.history.len(), 2);
    assert_eq!(session.history.turns()[0].content, "learn economics");
    assert_eq!(session.history.turns()[1].content, "Here is your path.");
  }

  #[tokio::test]
  async fn test_blank_goal_is_rejected_without_touching_session() {
    let pipeline = Pipeline::new(
      &PipelineConfig::default(),
      Arc::new(MockTextGenerator::new()),
      Arc::new(MockEmbeddingProvider::new()),
      Arc::new(MockVectorStore::new()),
    );
    let mut session = SessionState::new();

    assert_eq!(pipeline.submit(&mut session, "   ").await.unwrap_err(), PipelineError::EmptyGoal);
    assert!(session.history.is_empty());
    assert_eq!(session.last_state, None);
  }

  #[tokio::test]
  async fn test_synthesis_failure_clears_previous_results() {
    let config = PipelineConfig::default();
    let pipeline =
      Pipeline::new(&config, Arc::new(healthy_generator()), embedder(), Arc::new(healthy_store()));
    let mut session = SessionState::new();
    pipeline.submit(&mut session, "learn economics").await.unwrap();
    assert_eq!(session.result.total_matches(), 3);

    let mut generator = MockTextGenerator::new();
    generator.expect_complete().returning(|_, _| Ok("economics".to_string()));
    generator.expect_chat().returning(|_| Err(PipelineError::generation_unavailable("model crashed")));
    let failing = Pipeline::new(&config, Arc::new(generator), embedder(), Arc::new(healthy_store()));

    let submission = failing.submit(&mut session, "and statistics?").await.unwrap();

    assert_eq!(submission.state, PipelineState::Failed);
    assert_eq!(submission.trail.last(), Some(&PipelineState::Failed));
    assert!(submission.trail.contains(&PipelineState::Synthesizing));
    assert!(session.result.is_empty());
    assert_eq!(session.result.submission_id, submission.id);
    assert_eq!(session.history.len(), 4);

    let last = session.history.last().unwrap();
    assert!(last.content.starts_with("⚠️ Error: Text generation unavailable: model crashed"));
    assert!(last.content.contains("Make sure Ollama is running"));
  }

  #[tokio::test]
  async fn test_failed_corpus_is_degraded_not_fatal() {
    let mut store = MockVectorStore::new();
    store.expect_query().returning(|collection, _, _| match collection {
      "faculty" => Err(anyhow::anyhow!("connection reset")),
      "courses" => Ok(one_row("course code", "ECON 101")),
      _ => Ok(one_row("title", "Career Fair")),
    });

    let pipeline = Pipeline::new(&PipelineConfig::default(), Arc::new(healthy_generator()), embedder(), Arc::new(store));
    let mut session = SessionState::new();
    let submission = pipeline.submit(&mut session, "learn economics").await.unwrap();

    assert!(submission.is_completed());
    assert_eq!(session.result.degraded, vec![Corpus::Faculty]);
    assert!(session.result.faculty.is_empty());
    assert_eq!(session.result.courses.len(), 1);
    assert_eq!(session.result.events.len(), 1);
  }
}
