use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DocumentStore;
use crate::services::ai::LlmProvider;
use crate::services::auth::SessionSigner;
use crate::services::calendar::CalendarProvider;
use crate::services::email::EmailSender;
use crate::services::media::MediaStore;

/// Collaborators are built once in `main` and shared by every handler.
/// A `None` collaborator means the integration is not configured: its
/// notifications are reported as skipped and uploads are refused.
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: AppConfig,
    pub sessions: SessionSigner,
    pub llm: Box<dyn LlmProvider>,
    pub email: Option<Box<dyn EmailSender>>,
    pub calendar: Option<Box<dyn CalendarProvider>>,
    pub media: Option<Box<dyn MediaStore>>,
}
