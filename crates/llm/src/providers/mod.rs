pub mod claude;
pub mod ollama;
pub mod openai;

use examforge_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

/// Build the backend named by `LLM_PROVIDER`. Each provider validates its
/// own credentials and endpoint in `from_config`.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "openai" => Ok(Box::new(openai::OpenAiProvider::from_config(llm_config)?)),
        "anthropic" | "claude" => Ok(Box::new(claude::ClaudeProvider::from_config(llm_config)?)),
        "ollama" => Ok(Box::new(ollama::OllamaProvider::from_config(ollama_config))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}
