use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use chefbook::config::AppConfig;
use chefbook::db::SqliteStore;
use chefbook::routes::build_router;
use chefbook::services::ai::ollama::OllamaProvider;
use chefbook::services::ai::openai::OpenAiProvider;
use chefbook::services::ai::LlmProvider;
use chefbook::services::auth::SessionSigner;
use chefbook::services::calendar::{CalendarProvider, GoogleCalendar};
use chefbook::services::email::{EmailSender, SmtpEmailSender};
use chefbook::services::media::{CloudinaryMedia, MediaStore};
use chefbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = SqliteStore::open(&config.database_url)?;

    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {})", config.ollama_url);
            Box::new(OllamaProvider::new(config.ollama_url.clone(), config.ollama_model.clone()))
        }
        _ => {
            anyhow::ensure!(
                !config.llm_api_key.is_empty(),
                "LLM_API_KEY must be set unless LLM_PROVIDER=ollama"
            );
            tracing::info!("using OpenAI-compatible LLM provider (model: {})", config.llm_model);
            Box::new(OpenAiProvider::new(
                config.llm_base_url.clone(),
                config.llm_api_key.clone(),
                config.llm_model.clone(),
            ))
        }
    };

    let email: Option<Box<dyn EmailSender>> = if config.smtp_configured() {
        tracing::info!("sending email through {}:{}", config.smtp_host, config.smtp_port);
        Some(Box::new(SmtpEmailSender::from_config(&config)?))
    } else {
        tracing::warn!("SMTP_HOST/SMTP_FROM not set, booking emails will be skipped");
        None
    };

    let calendar: Option<Box<dyn CalendarProvider>> = if config.calendar_configured() {
        tracing::info!("syncing bookings to calendar {}", config.google_calendar_id);
        Some(Box::new(GoogleCalendar::new(
            config.google_calendar_id.clone(),
            config.google_calendar_token.clone(),
            config.calendar_time_zone.clone(),
        )))
    } else {
        tracing::warn!("GOOGLE_CALENDAR_TOKEN not set, calendar sync disabled (ICS export still available)");
        None
    };

    let media: Option<Box<dyn MediaStore>> = if config.cloudinary_configured() {
        Some(Box::new(CloudinaryMedia::new(
            config.cloudinary_cloud_name.clone(),
            config.cloudinary_api_key.clone(),
            config.cloudinary_api_secret.clone(),
            config.cloudinary_folder.clone(),
        )))
    } else {
        tracing::warn!("Cloudinary credentials not set, media uploads disabled");
        None
    };

    let session_secret = if config.session_secret.is_empty() {
        tracing::warn!("SESSION_SECRET not set, using a random secret; sessions end on restart");
        format!("{}{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
    } else {
        config.session_secret.clone()
    };
    let sessions = SessionSigner::new(
        session_secret.as_bytes(),
        chrono::Duration::hours(config.session_ttl_hours),
        config.secure_cookies,
    );

    let state = Arc::new(AppState {
        store: Arc::new(store),
        config: config.clone(),
        sessions,
        llm,
        email,
        calendar,
        media,
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
