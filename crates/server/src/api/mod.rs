//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared types and the generator guard live here in mod.rs.

mod alias;
pub mod doc;
mod evaluate;
mod exams;
mod health;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use examforge_llm::ExamGenerator;

use crate::state::AppState;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl ToString) -> Self {
        Self {
            error: error.into(),
            details: Some(details.to_string()),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn bad_request(error: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error)))
}

// ── Generator guard ──────────────────────────────────────────────

/// Return 503 when no LLM provider is configured.
pub(crate) fn require_generator(state: &AppState) -> Result<&ExamGenerator, ApiError> {
    state.generator.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new(
            "No LLM provider configured. Set OPENAI_API_KEY (or pick another LLM_PROVIDER).",
        )),
    ))
}

// ── Re-exports ───────────────────────────────────────────────────
// Preserves flat `api::foo` import paths used by router.rs registration.

pub use alias::generate_alias;
pub use evaluate::evaluate;
pub use exams::{create_exam, upload};
pub use health::health;
