use examforge_core::Config;
use examforge_llm::ExamGenerator;

use crate::upload_store::UploadStore;

pub struct AppState {
    /// None when no LLM provider is configured — generation routes answer 503.
    pub generator: Option<ExamGenerator>,
    pub uploads: UploadStore,
    pub config: Config,
}
