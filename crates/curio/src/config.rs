//! Configuration management for Curio
//!
//! Settings come from a YAML file when one is found, otherwise from defaults;
//! command-line flags are applied on top by the binary.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::Result;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CURIO_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurioConfig {
  #[serde(default)]
  pub ollama: OllamaConfig,
  #[serde(default)]
  pub store: StoreConfig,
  #[serde(default)]
  pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
  #[serde(default = "default_ollama_url")]
  pub base_url: String,
  #[serde(default = "default_chat_model")]
  pub chat_model: String,
  #[serde(default = "default_embedding_model")]
  pub embedding_model: String,
  /// Per-request timeout
  #[serde(default = "default_ollama_timeout")]
  pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  #[default]
  Memory,
  Chroma,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
  #[serde(default)]
  pub backend: StoreBackend,
  #[serde(default = "default_chroma_url")]
  pub chroma_url: String,
  /// Snapshot file for the memory backend; `~/.curio/store.json` when unset
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub snapshot: Option<PathBuf>,
  #[serde(default = "default_store_timeout")]
  pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
  /// Matches retrieved per corpus
  #[serde(default = "default_top_k")]
  pub top_k: usize,
  /// Width of the explanation fan-out
  #[serde(default = "default_max_concurrency")]
  pub max_concurrency: usize,
  /// History turns shown to the query refiner
  #[serde(default = "default_refine_history_turns")]
  pub refine_history_turns: usize,
  /// History turns shown to explanation and synthesis prompts
  #[serde(default = "default_prompt_history_turns")]
  pub prompt_history_turns: usize,
  /// Items per corpus listed in the synthesis prompt
  #[serde(default = "default_listing_limit")]
  pub listing_limit: usize,
  /// Extra attempts for a failed explanation; 0 keeps the single-shot behaviour
  #[serde(default)]
  pub explanation_retries: usize,
}

// Default value functions
fn default_ollama_url() -> String {
  "http://localhost:11434".to_string()
}
fn default_chat_model() -> String {
  "mistral".to_string()
}
fn default_embedding_model() -> String {
  "nomic-embed-text".to_string()
}
fn default_ollama_timeout() -> u64 {
  60
}
fn default_chroma_url() -> String {
  "http://localhost:8000".to_string()
}
fn default_store_timeout() -> u64 {
  30
}
fn default_top_k() -> usize {
  10
}
fn default_max_concurrency() -> usize {
  8
}
fn default_refine_history_turns() -> usize {
  6
}
fn default_prompt_history_turns() -> usize {
  4
}
fn default_listing_limit() -> usize {
  5
}

impl Default for OllamaConfig {
  fn default() -> Self {
    Self {
      base_url: default_ollama_url(),
      chat_model: default_chat_model(),
      embedding_model: default_embedding_model(),
      timeout_secs: default_ollama_timeout(),
    }
  }
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend: StoreBackend::default(),
      chroma_url: default_chroma_url(),
      snapshot: None,
      timeout_secs: default_store_timeout(),
    }
  }
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      top_k: default_top_k(),
      max_concurrency: default_max_concurrency(),
      refine_history_turns: default_refine_history_turns(),
      prompt_history_turns: default_prompt_history_turns(),
      listing_limit: default_listing_limit(),
      explanation_retries: 0,
    }
  }
}

impl StoreConfig {
  /// Resolve where the memory backend keeps its snapshot
  pub fn snapshot_path(&self) -> anyhow::Result<PathBuf> {
    if let Some(path) = &self.snapshot {
      return Ok(path.clone());
    }
    Ok(curio_home()?.join("store.json"))
  }
}

/// `~/.curio`
pub fn curio_home() -> anyhow::Result<PathBuf> {
  dirs::home_dir()
    .map(|home| home.join(".curio"))
    .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

impl CurioConfig {
  /// Load configuration from a YAML file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|e| PipelineError::config(format!("Cannot read {}: {}", path.display(), e)))?;
    let config: CurioConfig = serde_yaml::from_str(&content)
      .map_err(|e| PipelineError::config(format!("Cannot parse {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
  }

  /// Load from `explicit`, `$CURIO_CONFIG`, `./curio.yaml` or `~/.curio/config.yaml`,
  /// in that order, falling back to defaults when none exists
  pub fn load(explicit: Option<&Path>) -> Result<Self> {
    if let Some(path) = explicit {
      return Self::load_from_file(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
      if !path.trim().is_empty() {
        return Self::load_from_file(path);
      }
    }

    let mut candidates = vec![PathBuf::from("curio.yaml")];
    if let Ok(home) = curio_home() {
      candidates.push(home.join("config.yaml"));
    }

    for path in candidates {
      if path.exists() {
        tracing::debug!(path = %path.display(), "loading configuration");
        return Self::load_from_file(path);
      }
    }

    Ok(CurioConfig::default())
  }

  pub fn validate(&self) -> Result<()> {
    if self.pipeline.top_k == 0 {
      return Err(PipelineError::config("pipeline.top_k must be at least 1"));
    }
    if self.pipeline.max_concurrency == 0 {
      return Err(PipelineError::config("pipeline.max_concurrency must be at least 1"));
    }
    Ok(())
  }
}
