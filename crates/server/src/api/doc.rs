//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "examforge API",
        version = "0.1.0",
        description = "Document-to-exam generation: upload a document, get back a structured exam with LLM-generated questions.",
    ),
    tags(
        (name = "Health", description = "Server readiness"),
        (name = "Exams", description = "Exam generation from uploaded documents, alias and metadata"),
        (name = "Evaluation", description = "Answer scoring (local for choice questions, LLM for open-ended)"),
    ),
    paths(
        crate::api::health::health,
        crate::api::exams::upload,
        crate::api::exams::create_exam,
        crate::api::alias::generate_alias,
        crate::api::evaluate::evaluate,
    )
)]
pub struct ApiDoc;
