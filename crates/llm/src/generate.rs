//! Single-exchange generation calls: one chunk, one alias, one grading.
//!
//! Each call issues exactly one request to the provider and parses the
//! structured response. Retries, if any, are layered on top by the
//! orchestrator in `pipeline.rs`.

use tracing::{debug, info, warn};

use examforge_core::config::{GenerationConfig, LlmConfig, OllamaConfig};
use examforge_core::{ExamFragment, GenerationOptions, QuestionType};

use crate::prompts;
use crate::provider::{LlmError, LlmProvider, Prompt, SamplingParams};
use crate::response::{self, ExamMetadata, ResponseError};

pub use crate::response::ParsedEvaluation as Evaluation;

/// Human-facing label used when the alias call returns unusable output.
/// This fallback is specific to the alias path — every other parse failure
/// is fatal.
const ALIAS_FALLBACK: &str = "Untitled Exam";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation call failed: {0}")]
    Llm(#[from] LlmError),
    #[error("model returned no usable content")]
    EmptyResponse,
    #[error(transparent)]
    Malformed(#[from] ResponseError),
    #[error("no question types enabled in generation options")]
    NoTypesEnabled,
    #[error("document produced no text chunks")]
    NoChunks,
    #[error("chunk {index} failed: {source}")]
    ChunkFailed {
        index: usize,
        #[source]
        source: Box<GenerateError>,
    },
}

impl GenerateError {
    /// Provider-call failures are transient and worth retrying; parse
    /// failures are not — the same prompt would fail the same way.
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerateError::Llm(_) | GenerateError::EmptyResponse)
    }
}

/// Issues generation requests and parses their structured responses.
pub struct ExamGenerator {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    language: String,
    retry_attempts: u32,
    retry_base_delay_ms: u64,
}

impl ExamGenerator {
    pub fn new(provider: Box<dyn LlmProvider>, language: String) -> Self {
        Self {
            provider,
            temperature: 0.3,
            max_tokens: 8192,
            language,
            retry_attempts: 0,
            retry_base_delay_ms: 500,
        }
    }

    /// Override the retry policy (attempts beyond the first call, base
    /// backoff delay).
    pub fn with_retry(mut self, attempts: u32, base_delay_ms: u64) -> Self {
        self.retry_attempts = attempts;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(
        llm: &LlmConfig,
        ollama: &OllamaConfig,
        generation: &GenerationConfig,
    ) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(llm, ollama)?;
        Ok(Self {
            provider,
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            language: generation.exam_language.clone(),
            retry_attempts: generation.retry_attempts,
            retry_base_delay_ms: generation.retry_base_delay_ms,
        })
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub fn retry_base_delay_ms(&self) -> u64 {
        self.retry_base_delay_ms
    }

    async fn complete(&self, system: String, user: String) -> Result<String, GenerateError> {
        let response = self
            .provider
            .complete(
                &Prompt { system, user },
                SamplingParams {
                    temperature: self.temperature,
                    max_tokens: self.max_tokens,
                },
            )
            .await?;

        if response.trim().is_empty() {
            return Err(GenerateError::EmptyResponse);
        }
        debug!("LLM response: {} chars", response.len());
        Ok(response)
    }

    /// Generate one chunk's exam fragment. Exactly one provider request;
    /// no internal retry.
    pub async fn generate_fragment(
        &self,
        chunk_text: &str,
        options: &GenerationOptions,
        chunk_index: usize,
        total_chunks: usize,
    ) -> Result<ExamFragment, GenerateError> {
        info!(
            "Generating exam fragment for chunk {}/{}",
            chunk_index + 1,
            total_chunks
        );

        let system = prompts::exam_system_prompt(&self.language);
        let user = prompts::exam_chunk_prompt(
            chunk_text,
            options,
            chunk_index,
            total_chunks,
            &self.language,
        );

        let response = self.complete(system, user).await?;
        let fragment = response::parse_exam_fragment(&response)?;

        info!(
            "Chunk {}/{} produced {} sections",
            chunk_index + 1,
            total_chunks,
            fragment.sections.len()
        );
        Ok(fragment)
    }

    /// Generate a short alias for exam content. Falls back to a fixed
    /// label when the model returns something unusable.
    pub async fn generate_alias(&self, content: &str) -> Result<String, GenerateError> {
        let system = prompts::alias_system_prompt(&self.language);
        let user = prompts::alias_prompt(content, &self.language);

        let response = self.complete(system, user).await?;
        match response::parse_alias(&response) {
            Ok(alias) => Ok(alias),
            Err(e) => {
                warn!("Alias response unusable, using fallback label: {e}");
                Ok(ALIAS_FALLBACK.to_string())
            }
        }
    }

    /// Generate `{title, description}` metadata for the two-step creation
    /// flow. Missing fields are fatal here — no fallback.
    pub async fn generate_metadata(&self, content: &str) -> Result<ExamMetadata, GenerateError> {
        let system = prompts::alias_system_prompt(&self.language);
        let user = prompts::metadata_prompt(content, &self.language);

        let response = self.complete(system, user).await?;
        Ok(response::parse_metadata(&response)?)
    }

    /// Grade one open-ended answer via the same generate-and-parse protocol.
    pub async fn evaluate_open_answer(
        &self,
        question_text: &str,
        points: u32,
        answer: &str,
    ) -> Result<Evaluation, GenerateError> {
        let system = prompts::evaluation_system_prompt(&self.language);
        let user = prompts::evaluation_prompt(
            question_text,
            QuestionType::OpenEnded.as_str(),
            points,
            answer,
            &self.language,
        );

        let response = self.complete(system, user).await?;
        Ok(response::parse_evaluation(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct CannedProvider {
        response: Result<&'static str, u16>,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(
            &self,
            _prompt: &Prompt,
            _params: SamplingParams,
        ) -> Result<String, LlmError> {
            match self.response {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(LlmError::Api {
                    status,
                    body: "upstream error".into(),
                }),
            }
        }
    }

    fn generator(response: Result<&'static str, u16>) -> ExamGenerator {
        ExamGenerator::new(Box::new(CannedProvider { response }), "English".into())
    }

    #[tokio::test]
    async fn unusable_alias_response_falls_back_to_fixed_label() {
        let g = generator(Ok("I cannot name this exam, sorry."));
        let alias = g.generate_alias("some content").await.unwrap();
        assert_eq!(alias, ALIAS_FALLBACK);
    }

    #[tokio::test]
    async fn usable_alias_is_returned_verbatim() {
        let g = generator(Ok(r#"{"alias": "Intro Biology"}"#));
        let alias = g.generate_alias("some content").await.unwrap();
        assert_eq!(alias, "Intro Biology");
    }

    #[tokio::test]
    async fn provider_errors_are_not_masked_by_the_alias_fallback() {
        let g = generator(Err(503));
        assert!(matches!(
            g.generate_alias("some content").await,
            Err(GenerateError::Llm(_))
        ));
    }

    #[tokio::test]
    async fn blank_completion_is_an_empty_response_error() {
        let g = generator(Ok("   \n  "));
        assert!(matches!(
            g.generate_alias("some content").await,
            Err(GenerateError::EmptyResponse)
        ));
    }
}
