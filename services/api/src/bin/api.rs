//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, OpenAiSstAdapter, OpenAiTextAdapter},
    config::Config,
    error::ApiError,
    services::{
        AuthService, EvaluationService, FlashcardCache, FlashcardService, TranscriptionService,
    },
    web::{build_router, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use study_cards_core::ports::{SpeechToTextService, TextGenerationService};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Provider Adapters ---
    // A missing key leaves the provider unset; the affected endpoints report it per request.
    let llm_adapter: Option<Arc<dyn TextGenerationService>> = match &config.gemini_api_key {
        Some(key) => {
            let llm_config = OpenAIConfig::new()
                .with_api_key(key)
                .with_api_base(&config.llm_api_base);
            info!(model = %config.llm_model, "LLM provider initialized");
            let adapter: Arc<dyn TextGenerationService> = Arc::new(OpenAiTextAdapter::new(
                Client::with_config(llm_config),
                config.llm_model.clone(),
                config.llm_timeout,
            ));
            Some(adapter)
        }
        None => {
            warn!("GEMINI_API_KEY is not set; flashcard generation and grading are disabled");
            None
        }
    };

    let sst_adapter: Option<Arc<dyn SpeechToTextService>> = match &config.openai_api_key {
        Some(key) => {
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(key));
            let adapter: Arc<dyn SpeechToTextService> =
                Arc::new(OpenAiSstAdapter::new(openai_client, config.stt_model.clone()));
            Some(adapter)
        }
        None => {
            warn!("OPENAI_API_KEY is not set; audio transcription is disabled");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        auth: Arc::new(AuthService::new(db_adapter, config.session_ttl)),
        flashcards: Arc::new(FlashcardService::new(
            llm_adapter.clone(),
            FlashcardCache::new(config.flashcard_cache_capacity),
        )),
        transcription: Arc::new(TranscriptionService::new(sst_adapter)),
        evaluation: Arc::new(EvaluationService::new(llm_adapter)),
    });

    // --- 5. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(build_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
