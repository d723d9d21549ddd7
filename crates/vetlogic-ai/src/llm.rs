//! Chat completions client.
//!
//! Talks to any `OpenAI`-compatible endpoint; the defaults point at
//! `DeepSeek`. Every request asks for a JSON object response and is bounded
//! by the configured timeout. Status codes are classified into
//! [`AiError`] variants so the player sees whether the key, the balance or
//! the network is at fault. No retries.

use std::time::Duration;

use vetlogic_core::config::LlmConfig;

use crate::error::AiError;
use crate::prompt::RenderedPrompt;

/// Client for `{api_url}/chat/completions`.
pub struct ChatClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("has_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client from configuration.
    ///
    /// A missing key is not an error here; calls fail with
    /// [`AiError::NotConfigured`] until one is supplied.
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Whether an API key is present.
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a prompt and return the message content.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::NotConfigured("DEEPSEEK_API_KEY is not set".to_owned()))?;
        let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let started = std::time::Instant::now();

        let content = tokio::time::timeout(self.timeout, self.send(api_key, prompt))
            .await
            .map_err(|elapsed| {
                tracing::warn!(timeout_ms = ms, %elapsed, "chat completion timed out");
                AiError::Timeout { ms }
            })??;

        tracing::debug!(
            model = %self.model,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "chat completion finished"
        );
        Ok(content)
    }

    async fn send(&self, api_key: &str, prompt: &RenderedPrompt) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.api_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": self.temperature,
            "response_format": {"type": "json_object"},
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("unable to read error body: {e}"));
            tracing::warn!(status = status.as_u16(), body = %error_body, "chat completion rejected");
            return Err(AiError::from_status(status.as_u16(), error_body));
        }

        let json: serde_json::Value = response.json().await?;
        extract_content(&json)
    }
}

/// Extract `choices[0].message.content` from a chat completions response.
pub fn extract_content(json: &serde_json::Value) -> Result<String, AiError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| AiError::Parse("response missing choices[0].message.content".to_owned()))
}
