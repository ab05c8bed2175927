//! Alias and metadata generation for the two-call exam creation flow.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

use super::{bad_request, require_generator, ApiError, ErrorResponse};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AliasRequest {
    /// Raw exam content to name.
    pub content: Option<String>,
    /// Handle from a previous `/api/upload` response.
    #[serde(rename = "fileId")]
    #[schema(value_type = Option<String>)]
    pub file_id: Option<Uuid>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum AliasResponse {
    Alias { alias: String },
    Metadata { title: String, description: String },
}

/// Generate a short alias or title/description for exam content
///
/// With `content`, responds `{alias}`. With `fileId`, re-extracts the
/// stored upload's text and responds `{title, description}`.
#[utoipa::path(
    post,
    path = "/api/generate-alias",
    tag = "Exams",
    request_body = AliasRequest,
    responses(
        (status = 200, description = "Generated alias or metadata", body = AliasResponse),
        (status = 400, description = "Neither content nor fileId provided", body = ErrorResponse),
        (status = 404, description = "Unknown or expired fileId", body = ErrorResponse),
        (status = 503, description = "No LLM provider configured", body = ErrorResponse)
    )
)]
pub async fn generate_alias(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AliasRequest>,
) -> Result<Json<AliasResponse>, ApiError> {
    let generator = require_generator(&state)?;

    if let Some(file_id) = request.file_id {
        let upload = state.uploads.get(file_id).await.ok_or((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("File not found or expired")),
        ))?;

        let extracted = examforge_ingest::extract_text(&upload.bytes, &upload.filename)
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::with_details("Text extraction failed", e)),
                )
            })?;

        let metadata = generator
            .generate_metadata(&extracted.text)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::with_details("Metadata generation failed", e)),
                )
            })?;
        info!("Generated metadata for upload '{}'", upload.filename);

        return Ok(Json(AliasResponse::Metadata {
            title: metadata.title,
            description: metadata.description,
        }));
    }

    let content = match request.content {
        Some(c) if !c.trim().is_empty() => c,
        _ => return Err(bad_request("Provide either content or fileId")),
    };

    let alias = generator.generate_alias(&content).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_details("Alias generation failed", e)),
        )
    })?;

    Ok(Json(AliasResponse::Alias { alias }))
}
