use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use curio::cli::commands::{self, Overrides};
use curio::config::{CurioConfig, StoreBackend};
use curio::models::Corpus;
use curio::pipeline::PipelineState;

/// Exit status of an `ask` whose submission failed after it was reported
const SUBMISSION_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "curio")]
#[command(about = "Curio - Learning-goal advisor\nFinds courses, faculty and events for what you want to learn, and explains why")]
#[command(version)]
struct Cli {
  /// Configuration file (defaults to $CURIO_CONFIG, ./curio.yaml, ~/.curio/config.yaml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Vector store backend
  #[arg(long, global = true, value_enum)]
  store: Option<StoreBackend>,

  /// Show debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

/// Pipeline tuning shared by the goal commands
#[derive(Args)]
struct Tuning {
  /// Matches retrieved per corpus
  #[arg(long)]
  top_k: Option<usize>,
  /// Concurrent explanation requests
  #[arg(long)]
  concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
  /// Answer a single learning goal
  Ask {
    /// The learning goal (space-separated words are joined)
    #[arg(required = true)]
    goal: Vec<String>,
    #[command(flatten)]
    tuning: Tuning,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
  },
  /// Start an interactive advising session
  Chat {
    #[command(flatten)]
    tuning: Tuning,
  },
  /// Rebuild a corpus collection from a JSONL file of records
  Index {
    #[arg(value_enum)]
    corpus: Corpus,
    /// One {"id"?, "document", "metadata"} object per line
    records: PathBuf,
  },
}

async fn handle(command: Command, config: CurioConfig, store: Option<StoreBackend>) -> Result<ExitCode> {
  let configure = |tuning: Option<&Tuning>| -> Result<CurioConfig> {
    let mut config = config.clone();
    let overrides = Overrides {
      store,
      top_k: tuning.and_then(|t| t.top_k),
      concurrency: tuning.and_then(|t| t.concurrency),
    };
    overrides.apply(&mut config)?;
    Ok(config)
  };

  match command {
    Command::Ask { goal, tuning, json } => {
      let config = configure(Some(&tuning))?;
      match commands::ask(&config, &goal.join(" "), json).await? {
        PipelineState::Failed => Ok(ExitCode::from(SUBMISSION_FAILED)),
        _ => Ok(ExitCode::SUCCESS),
      }
    }
    Command::Chat { tuning } => {
      commands::chat(&configure(Some(&tuning))?).await?;
      Ok(ExitCode::SUCCESS)
    }
    Command::Index { corpus, records } => {
      commands::index(&configure(None)?, corpus, &records).await?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  bentley::init_tracing(if cli.verbose { "curio=debug,info" } else { "curio=info,warn" });

  let config = CurioConfig::load(cli.config.as_deref())?;
  handle(cli.command, config, cli.store).await
}
