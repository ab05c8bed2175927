use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use examforge_core::config::OllamaConfig;

use crate::provider::{LlmError, LlmProvider, Prompt, SamplingParams};

/// Local Ollama backend. Needs no credentials; the token cap maps onto
/// Ollama's `num_predict` option.
pub struct OllamaProvider {
    client: reqwest::Client,
    chat_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            chat_url: format!("{}/api/chat", config.url.trim_end_matches('/')),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, prompt: &Prompt, params: SamplingParams) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
            "stream": false,
            "options": {
                "temperature": params.temperature,
                "num_predict": params.max_tokens,
            },
        });

        debug!("Ollama request to {}", self.chat_url);

        let response = self.client.post(&self.chat_url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let value: serde_json::Value = response.json().await?;
        value["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LlmError::UnexpectedShape("message.content missing".into()))
    }
}
