use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use curio::config::OllamaConfig;
use curio::services::{ChatMessage, EmbeddingProvider, OllamaClient, TextGenerator};
use curio::PipelineError;

fn client(server: &MockServer) -> OllamaClient {
  OllamaClient::new(&OllamaConfig { base_url: server.uri(), timeout_secs: 5, ..OllamaConfig::default() }).unwrap()
}

fn chat_reply(content: &str) -> ResponseTemplate {
  ResponseTemplate::new(200).set_body_json(json!({
    "model": "mistral",
    "message": {"role": "assistant", "content": content},
    "done": true
  }))
}

#[tokio::test]
async fn test_embed_posts_model_and_prompt() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/embeddings"))
    .and(body_json(json!({"model": "nomic-embed-text", "prompt": "pricing strategy"})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.5, -0.25, 1.0]})))
    .expect(1)
    .mount(&server)
    .await;

  let embedding = client(&server).embed("pricing strategy").await.unwrap();
  assert_eq!(embedding, vec![0.5, -0.25, 1.0]);
}

#[tokio::test]
async fn test_empty_embedding_is_unavailable() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/embeddings"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": []})))
    .mount(&server)
    .await;

  let err = client(&server).embed("pricing").await.unwrap_err();
  assert!(matches!(err, PipelineError::EmbeddingUnavailable { .. }));
  assert!(err.to_string().contains("returned an empty embedding"));
}

#[tokio::test]
async fn test_embedding_server_error_is_unavailable() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/embeddings"))
    .respond_with(ResponseTemplate::new(404).set_body_string("model \"nomic-embed-text\" not found"))
    .mount(&server)
    .await;

  let err = client(&server).embed("pricing").await.unwrap_err();
  assert!(matches!(err, PipelineError::EmbeddingUnavailable { .. }));
  assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_complete_caps_tokens_and_trims_reply() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/chat"))
    .and(body_partial_json(json!({
      "model": "mistral",
      "stream": false,
      "messages": [{"role": "user", "content": "Search query:"}],
      "options": {"num_predict": 32}
    })))
    .respond_with(chat_reply("  behavioral economics \n"))
    .expect(1)
    .mount(&server)
    .await;

  let reply = client(&server).complete("Search query:", Some(32)).await.unwrap();
  assert_eq!(reply, "behavioral economics");
}

#[tokio::test]
async fn test_chat_sends_every_message_in_order() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/chat"))
    .and(body_json(json!({
      "model": "mistral",
      "stream": false,
      "messages": [
        {"role": "system", "content": "You are an advisor."},
        {"role": "user", "content": "I like markets"},
        {"role": "assistant", "content": "Try MKT 310."},
        {"role": "user", "content": "And pricing?"}
      ]
    })))
    .respond_with(chat_reply("Pricing builds on markets."))
    .expect(1)
    .mount(&server)
    .await;

  let messages = [
    ChatMessage::system("You are an advisor."),
    ChatMessage::user("I like markets"),
    ChatMessage::assistant("Try MKT 310."),
    ChatMessage::user("And pricing?"),
  ];
  let reply = client(&server).chat(&messages).await.unwrap();
  assert_eq!(reply, "Pricing builds on markets.");
}

#[tokio::test]
async fn test_chat_server_error_is_generation_unavailable() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/chat"))
    .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
    .mount(&server)
    .await;

  let err = client(&server).complete("hello", None).await.unwrap_err();
  assert!(matches!(err, PipelineError::GenerationUnavailable { .. }));
  assert!(err.to_string().contains("Chat request failed with 500"));
  assert!(err.to_string().contains("model crashed"));
}

#[tokio::test]
async fn test_malformed_chat_reply_is_generation_unavailable() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/chat"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "wrong endpoint shape"})))
    .mount(&server)
    .await;

  let err = client(&server).complete("hello", None).await.unwrap_err();
  assert!(matches!(err, PipelineError::GenerationUnavailable { .. }));
}
