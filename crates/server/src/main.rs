mod api;
mod router;
mod state;
mod upload_store;

use std::sync::Arc;

use tracing::{info, warn};

use examforge_llm::ExamGenerator;

use crate::state::AppState;
use crate::upload_store::UploadStore;

fn load_config() -> examforge_core::Config {
    examforge_core::config::load_dotenv();
    examforge_core::Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = load_config();
    config.log_summary();

    // LLM init is config-based and fast -- keep it synchronous.
    let generator = if config.llm.is_configured() {
        match ExamGenerator::from_config(&config.llm, &config.ollama, &config.generation) {
            Ok(g) => {
                info!("Exam generator ready (provider: {})", config.llm.provider);
                Some(g)
            }
            Err(e) => {
                warn!("Exam generator not available: {} — generation routes will answer 503", e);
                None
            }
        }
    } else {
        warn!(
            "No credentials for LLM provider '{}' — generation routes will answer 503",
            config.llm.provider
        );
        None
    };

    let state = Arc::new(AppState {
        generator,
        uploads: UploadStore::from_config(&config.upload),
        config,
    });

    let app = router::build_router(Arc::clone(&state));

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", state.config.server.port);
    axum::serve(listener, app).await?;

    Ok(())
}
