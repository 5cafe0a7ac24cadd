//! Small helpers shared by the HTTP adapters

use anyhow::{anyhow, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// Build a client whose every request is bounded by `timeout_secs`
pub fn build_client(timeout_secs: u64) -> Result<Client> {
  Client::builder()
    .timeout(Duration::from_secs(timeout_secs))
    .build()
    .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))
}

/// Parse a base URL so relative endpoint paths join underneath it
pub fn parse_base_url(raw: &str) -> Result<Url> {
  let mut base = Url::parse(raw).map_err(|e| anyhow!("Invalid base URL '{}': {}", raw, e))?;
  if !base.path().ends_with('/') {
    let path = format!("{}/", base.path());
    base.set_path(&path);
  }
  Ok(base)
}

pub fn endpoint(base: &Url, path: &str) -> Result<Url> {
  base.join(path.trim_start_matches('/')).map_err(|e| anyhow!("Invalid endpoint '{}': {}", path, e))
}

/// Turn a non-success response into an error carrying the body text
pub async fn ensure_success(response: Response, action: &str) -> Result<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  Err(anyhow!("{} failed with {}: {}", action, status, body.trim()))
}
