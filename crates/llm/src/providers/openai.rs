use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use examforge_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider, Prompt, SamplingParams};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for any OpenAI-compatible chat completion API. The base URL is
/// configurable so alternative deployments (DeepSeek, vLLM, etc.) work
/// unchanged; exam prompts make no use of vendor-specific extensions.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    chat_url: String,
}

impl OpenAiProvider {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
        let base = config
            .openai_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.openai_model.clone(),
            chat_url: format!("{}/v1/chat/completions", base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, prompt: &Prompt, params: SamplingParams) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        debug!("OpenAI-compatible request to {}", self.chat_url);

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let value: serde_json::Value = response.json().await?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LlmError::UnexpectedShape("choices[0].message.content missing".into()))
    }
}
