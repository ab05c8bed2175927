use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub generation: GenerationConfig,
    pub upload: UploadConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            llm: LlmConfig::from_env(),
            ollama: OllamaConfig::from_env(),
            generation: GenerationConfig::from_env(),
            upload: UploadConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!("  llm:         provider={}", self.llm.provider);
        tracing::info!("  ollama:      url={}", self.ollama.url);
        tracing::info!(
            "  generation:  max_tokens_per_chunk={}, language={}, retries={}",
            self.generation.max_tokens_per_chunk,
            self.generation.exam_language,
            self.generation.retry_attempts,
        );
        tracing::info!(
            "  upload:      max_file_mb={}, ttl_secs={}, max_entries={}",
            self.upload.max_file_bytes / (1024 * 1024),
            self.upload.ttl_secs,
            self.upload.max_entries,
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 5000),
            cors_origin: env_or("CORS_ORIGIN", "*"),
        }
    }
}

// ── LLM (OpenAI-compatible / Anthropic / Ollama) ──────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub anthropic_base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env() -> Self {
        Self {
            provider: env_or("LLM_PROVIDER", "openai"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_model: env_or("ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            anthropic_base_url: env_opt("ANTHROPIC_BASE_URL"),
            temperature: env_or("LLM_TEMPERATURE", "0.3").parse().unwrap_or(0.3),
            max_tokens: env_u32("LLM_MAX_TOKENS", 8192),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env() -> Self {
        Self {
            url: env_or("OLLAMA_URL", "http://localhost:11434"),
            model: env_or("OLLAMA_MODEL", "llama3.2"),
        }
    }
}

// ── Generation pipeline ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Estimated-token budget per chunk sent to the model.
    pub max_tokens_per_chunk: usize,
    /// Language the generated exam content should be written in.
    pub exam_language: String,
    /// Extra attempts after a failed provider call (0 = no retry).
    pub retry_attempts: u32,
    /// Base delay for exponential backoff between attempts.
    pub retry_base_delay_ms: u64,
}

impl GenerationConfig {
    fn from_env() -> Self {
        Self {
            max_tokens_per_chunk: env_usize("GENERATION_MAX_TOKENS_PER_CHUNK", 30_000),
            exam_language: env_or("EXAM_LANGUAGE", "Hebrew"),
            retry_attempts: env_u32("GENERATION_RETRY_ATTEMPTS", 2),
            retry_base_delay_ms: env_u64("GENERATION_RETRY_DELAY_MS", 500),
        }
    }
}

// ── Transient upload store ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_bytes: usize,
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl UploadConfig {
    fn from_env() -> Self {
        Self {
            max_file_bytes: env_usize("UPLOAD_MAX_FILE_BYTES", 50 * 1024 * 1024),
            ttl_secs: env_u64("UPLOAD_TTL_SECS", 900),
            max_entries: env_usize("UPLOAD_MAX_ENTRIES", 128),
        }
    }
}
