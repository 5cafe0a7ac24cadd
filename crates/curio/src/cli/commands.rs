use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::display::display_result;
use crate::config::{CurioConfig, StoreBackend};
use crate::indexing;
use crate::models::{Corpus, PipelineResult};
use crate::pipeline::{Pipeline, PipelineState, SessionState, Submission};
use crate::services::{open_store, OllamaClient};

/// Command-line values that take precedence over the loaded configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
  pub store: Option<StoreBackend>,
  pub top_k: Option<usize>,
  pub concurrency: Option<usize>,
}

impl Overrides {
  pub fn apply(&self, config: &mut CurioConfig) -> crate::Result<()> {
    if let Some(store) = self.store {
      config.store.backend = store;
    }
    if let Some(top_k) = self.top_k {
      config.pipeline.top_k = top_k;
    }
    if let Some(concurrency) = self.concurrency {
      config.pipeline.max_concurrency = concurrency;
    }
    config.validate()
  }
}

async fn build_pipeline(config: &CurioConfig) -> Result<Pipeline> {
  let ollama = Arc::new(OllamaClient::new(&config.ollama)?);
  let store = open_store(config).await?;
  Ok(Pipeline::new(&config.pipeline, ollama.clone(), ollama, store))
}

#[derive(Serialize)]
struct AskOutput<'a> {
  state: PipelineState,
  refined_query: Option<&'a str>,
  #[serde(flatten)]
  result: &'a PipelineResult,
}

fn report_failure(submission: &Submission, session: &SessionState) {
  if let Some(turn) = session.history.last() {
    bentley::error(&turn.content);
  }
  tracing::debug!(submission = %submission.id, trail = ?submission.trail, "submission failed");
}

/// Answer a single goal on a fresh session.
///
/// A failed submission is reported here and comes back as
/// `PipelineState::Failed`, not as an error.
pub async fn ask(config: &CurioConfig, goal: &str, json: bool) -> Result<PipelineState> {
  let pipeline = build_pipeline(config).await?;
  let mut session = SessionState::new();

  let submission = pipeline.submit(&mut session, goal).await?;

  if json {
    let output = AskOutput {
      state: submission.state,
      refined_query: submission.refined_query.as_deref(),
      result: &session.result,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
  } else if submission.is_completed() {
    if let Some(query) = &submission.refined_query {
      bentley::verbose!("Searched for: {}", query);
    }
    display_result(&session.result);
  } else {
    report_failure(&submission, &session);
  }

  Ok(submission.state)
}

fn prompt_user() -> Result<()> {
  print!("{} ", "you>".green().bold());
  std::io::stdout().flush()?;
  Ok(())
}

/// Interactive session; one goal per line until `exit`, `quit` or end of input
pub async fn chat(config: &CurioConfig) -> Result<()> {
  let pipeline = build_pipeline(config).await?;
  let mut session = SessionState::new();
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  println!("{}", "Tell me what you want to learn. Type 'exit' to leave.".cyan());
  prompt_user()?;

  while let Some(line) = lines.next_line().await? {
    let goal = line.trim();
    if goal.eq_ignore_ascii_case("exit") || goal.eq_ignore_ascii_case("quit") {
      break;
    }
    if goal.is_empty() {
      prompt_user()?;
      continue;
    }

    let submission = pipeline.submit(&mut session, goal).await?;
    if submission.is_completed() {
      display_result(&session.result);
    } else {
      report_failure(&submission, &session);
    }
    prompt_user()?;
  }

  println!();
  Ok(())
}

/// Rebuild one corpus collection from a JSONL file
pub async fn index(config: &CurioConfig, corpus: Corpus, path: &Path) -> Result<()> {
  let records = indexing::load_records(path).await?;
  if records.is_empty() {
    bentley::warn!("{} contains no records; {} will be emptied", path.display(), corpus.collection_name());
  }

  let ollama = OllamaClient::new(&config.ollama)?;
  let store = open_store(config).await?;

  bentley::info!("Indexing {} {} records from {}", records.len(), corpus, path.display());
  let report = indexing::index_corpus(
    corpus,
    &records,
    &ollama,
    store.as_ref(),
    config.pipeline.max_concurrency,
  )
  .await?;

  bentley::success!("Indexed {} records into '{}'", report.records, corpus.collection_name());
  Ok(())
}
