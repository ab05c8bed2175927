//! Backend abstraction for the generation calls.
//!
//! Every call in this service is a single exchange: one system instruction
//! plus one user payload, answered by one completion. There is no
//! conversation history, so the seam is a `Prompt` pair rather than a
//! message list; each backend maps the pair onto its own wire format.

use async_trait::async_trait;

/// One generation exchange, assembled by `prompts.rs`.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Sampling knobs forwarded to every backend.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for LLM backends — each implementation owns its credentials,
/// endpoint, and model, resolved from config at construction.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one exchange and return the completion text.
    async fn complete(&self, prompt: &Prompt, params: SamplingParams) -> Result<String, LlmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request to LLM backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("LLM backend returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}
