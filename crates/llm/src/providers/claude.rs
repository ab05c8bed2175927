use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use examforge_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider, Prompt, SamplingParams};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client. The system instruction rides in the
/// dedicated `system` field, so the message list is the single user
/// payload.
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    messages_url: String,
}

impl ClaudeProvider {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .anthropic_api_key
            .clone()
            .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
        let base = config
            .anthropic_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.anthropic_model.clone(),
            messages_url: format!("{}/v1/messages", base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(&self, prompt: &Prompt, params: SamplingParams) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user},
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        debug!("Anthropic request to {}", self.messages_url);

        let response = self
            .client
            .post(&self.messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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
        value["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LlmError::UnexpectedShape("content[0].text missing".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>, base_url: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider: "anthropic".into(),
            openai_api_key: None,
            openai_model: "gpt-4o".into(),
            openai_base_url: None,
            anthropic_api_key: api_key.map(str::to_string),
            anthropic_model: "claude-sonnet-4-5-20250929".into(),
            anthropic_base_url: base_url.map(str::to_string),
            temperature: 0.3,
            max_tokens: 8192,
        }
    }

    #[test]
    fn missing_api_key_is_rejected_at_construction() {
        assert!(matches!(
            ClaudeProvider::from_config(&config(None, None)),
            Err(LlmError::NotConfigured(_))
        ));
    }

    #[test]
    fn base_url_override_is_honored() {
        let provider =
            ClaudeProvider::from_config(&config(Some("sk-ant-test"), Some("http://proxy:9000/")))
                .unwrap();
        assert_eq!(provider.messages_url, "http://proxy:9000/v1/messages");
    }
}
