//! Exam generation endpoints: multipart upload through the extract →
//! chunk → generate pipeline.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use examforge_core::{ExamDocument, GenerationOptions};
use examforge_ingest::{split_into_chunks, ExtractionError};
use examforge_llm::{generate_exam, GenerateError};

use crate::state::AppState;

use super::{bad_request, require_generator, ApiError, ErrorResponse};

// ── Request/Response types ────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub exam: ExamDocument,
    /// Handle for the follow-up alias/metadata call.
    #[serde(rename = "fileId")]
    #[schema(value_type = String)]
    pub file_id: Uuid,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateExamResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub exam: ExamDocument,
}

// ── Multipart parsing ─────────────────────────────

struct UploadParts {
    filename: String,
    bytes: Vec<u8>,
    options: GenerationOptions,
}

async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<UploadParts, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut options: Option<GenerationOptions> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read file: {e}")))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("options") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read options: {e}")))?;
                let parsed = serde_json::from_str(&raw)
                    .map_err(|e| bad_request(format!("Invalid generation options: {e}")))?;
                options = Some(parsed);
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| bad_request("No file provided"))?;
    let options = options.ok_or_else(|| bad_request("No generation options provided"))?;

    if bytes.len() > max_bytes {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse::new(format!(
                "File exceeds the {} byte upload limit",
                max_bytes
            ))),
        ));
    }

    Ok(UploadParts {
        filename,
        bytes,
        options,
    })
}

// ── Pipeline ──────────────────────────────────────

fn extraction_error(e: ExtractionError) -> ApiError {
    match e {
        ExtractionError::UnsupportedType(_) => bad_request(e.to_string()),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_details(
                "Text extraction failed",
                other,
            )),
        ),
    }
}

fn generation_error(e: GenerateError) -> ApiError {
    match e {
        GenerateError::NoTypesEnabled => bad_request(e.to_string()),
        GenerateError::NoChunks => bad_request("Document contains no extractable text"),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_details("Exam generation failed", other)),
        ),
    }
}

async fn run_pipeline(state: &AppState, parts: &UploadParts) -> Result<ExamDocument, ApiError> {
    let generator = require_generator(state)?;

    let extracted = examforge_ingest::extract_text(&parts.bytes, &parts.filename)
        .map_err(extraction_error)?;
    info!(
        "Extracted '{}' (type={}): {} chars",
        extracted.filename,
        extracted.file_type,
        extracted.char_count()
    );

    let chunks = split_into_chunks(
        &extracted.text,
        state.config.generation.max_tokens_per_chunk,
    );
    info!("Split into {} chunks", chunks.len());

    let exam = generate_exam(generator, &chunks, &parts.options)
        .await
        .map_err(generation_error)?;
    info!(
        "Generated exam: {} sections, {} questions",
        exam.sections.len(),
        exam.question_count()
    );
    Ok(exam)
}

// ── POST /api/upload ──────────────────────────────

/// Upload a document and generate an exam from it
///
/// Accepts multipart/form-data with a `file` field and a JSON-encoded
/// `options` field. Responds with the generated exam plus a `fileId`
/// for the follow-up alias/metadata call.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Exams",
    request_body(content_type = "multipart/form-data", description = "File + generation options"),
    responses(
        (status = 200, description = "Generated exam", body = UploadResponse),
        (status = 400, description = "Unsupported file type or invalid options", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse),
        (status = 503, description = "No LLM provider configured", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let parts = read_upload(multipart, state.config.upload.max_file_bytes).await?;
    let exam = run_pipeline(&state, &parts).await?;

    let file_id = state
        .uploads
        .insert(parts.filename.clone(), parts.bytes)
        .await;

    Ok(Json(UploadResponse { exam, file_id }))
}

// ── POST /api/create-exam ─────────────────────────

/// Generate an exam from an uploaded document
///
/// Same pipeline as `/api/upload`, responding `{success, exam}` without
/// retaining the file.
#[utoipa::path(
    post,
    path = "/api/create-exam",
    tag = "Exams",
    request_body(content_type = "multipart/form-data", description = "File + generation options"),
    responses(
        (status = 200, description = "Generated exam", body = CreateExamResponse),
        (status = 400, description = "Unsupported file type or invalid options", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse),
        (status = 503, description = "No LLM provider configured", body = ErrorResponse)
    )
)]
pub async fn create_exam(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<CreateExamResponse>, ApiError> {
    let parts = read_upload(multipart, state.config.upload.max_file_bytes).await?;
    let exam = run_pipeline(&state, &parts).await?;

    Ok(Json(CreateExamResponse {
        success: true,
        exam,
    }))
}
