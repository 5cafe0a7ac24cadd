//! Ollama HTTP client serving both embeddings and chat completions

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::OllamaConfig;
use crate::error::PipelineError;
use crate::services::embeddings::EmbeddingProvider;
use crate::services::generation::{ChatMessage, TextGenerator};
use crate::services::http::{build_client, endpoint, ensure_success, parse_base_url};

pub struct OllamaClient {
  client: Client,
  base_url: Url,
  chat_model: String,
  embedding_model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: &'a [ChatMessage],
  stream: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  options: Option<ChatOptions>,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
  num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
  content: String,
}

impl OllamaClient {
  pub fn new(config: &OllamaConfig) -> Result<Self> {
    Ok(Self {
      client: build_client(config.timeout_secs)?,
      base_url: parse_base_url(&config.base_url)?,
      chat_model: config.chat_model.clone(),
      embedding_model: config.embedding_model.clone(),
    })
  }

  async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
    let request = EmbeddingRequest { model: &self.embedding_model, prompt: text };
    let response =
      self.client.post(endpoint(&self.base_url, "api/embeddings")?).json(&request).send().await?;
    let response: EmbeddingResponse = ensure_success(response, "Embedding request").await?.json().await?;

    if response.embedding.is_empty() {
      return Err(anyhow!("Model '{}' returned an empty embedding", self.embedding_model));
    }
    Ok(response.embedding)
  }

  async fn request_chat(&self, messages: &[ChatMessage], max_tokens: Option<u32>) -> Result<String> {
    let request = ChatRequest {
      model: &self.chat_model,
      messages,
      stream: false,
      options: max_tokens.map(|num_predict| ChatOptions { num_predict }),
    };
    let response = self.client.post(endpoint(&self.base_url, "api/chat")?).json(&request).send().await?;
    let response: ChatResponse = ensure_success(response, "Chat request").await?.json().await?;
    Ok(response.message.content.trim().to_string())
  }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
  async fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
    self
      .request_embedding(text)
      .await
      .map_err(|e| PipelineError::embedding_unavailable(format!("{e:#}")))
  }
}

#[async_trait]
impl TextGenerator for OllamaClient {
  async fn complete(&self, prompt: &str, max_tokens: Option<u32>) -> crate::Result<String> {
    self
      .request_chat(&[ChatMessage::user(prompt)], max_tokens)
      .await
      .map_err(|e| PipelineError::generation_unavailable(format!("{e:#}")))
  }

  async fn chat(&self, messages: &[ChatMessage]) -> crate::Result<String> {
    self
      .request_chat(messages, None)
      .await
      .map_err(|e| PipelineError::generation_unavailable(format!("{e:#}")))
  }
}
