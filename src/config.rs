use std::env;

pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 30;
pub const MAX_EVENT_DURATION_HOURS: i64 = 24;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub site_url: String,
    pub business_name: String,
    pub cors_origin: Option<String>,

    pub admin_username: String,
    pub admin_password_hash: String,
    pub admin_password: String,
    pub admin_email: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,

    pub llm_provider: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub ollama_url: String,
    pub ollama_model: String,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
    pub smtp_starttls: bool,

    pub google_calendar_id: String,
    pub google_calendar_token: String,
    pub calendar_time_zone: String,
    pub event_duration_hours: i64,

    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub cloudinary_folder: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses an integer setting and clamps it into `min..=max`.
fn hours_or(key: &str, default: i64, min: i64, max: i64) -> i64 {
    parsed_or(key, default).clamp(min, max)
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parsed_or("PORT", 3000),
            database_url: var_or("DATABASE_URL", "chefbook.db"),
            site_url: var_or("SITE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            business_name: var_or("BUSINESS_NAME", "Private Chef"),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty()),

            admin_username: var_or("ADMIN_USERNAME", "admin"),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").unwrap_or_default(),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_default(),
            session_secret: env::var("SESSION_SECRET").unwrap_or_default(),
            session_ttl_hours: hours_or("SESSION_TTL_HOURS", 8, 1, MAX_SESSION_TTL_HOURS),
            secure_cookies: parsed_or("SECURE_COOKIES", false),

            llm_provider: var_or("LLM_PROVIDER", "openai"),
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            llm_base_url: var_or("LLM_BASE_URL", "https://api.openai.com/v1"),
            llm_model: var_or("LLM_MODEL", "gpt-4o-mini"),
            ollama_url: var_or("OLLAMA_URL", "http://localhost:11434"),
            ollama_model: var_or("OLLAMA_MODEL", "llama3.2"),

            smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: parsed_or("SMTP_PORT", 587),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            smtp_from: env::var("SMTP_FROM").unwrap_or_default(),
            smtp_starttls: parsed_or("SMTP_STARTTLS", true),

            google_calendar_id: var_or("GOOGLE_CALENDAR_ID", "primary"),
            google_calendar_token: env::var("GOOGLE_CALENDAR_TOKEN").unwrap_or_default(),
            calendar_time_zone: var_or("CALENDAR_TIME_ZONE", "UTC"),
            event_duration_hours: hours_or("EVENT_DURATION_HOURS", 4, 1, MAX_EVENT_DURATION_HOURS),

            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
            cloudinary_api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
            cloudinary_api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
            cloudinary_folder: var_or("CLOUDINARY_FOLDER", "chefbook"),
        }
    }

    pub fn smtp_configured(&self) -> bool {
        !self.smtp_host.is_empty() && !self.smtp_from.is_empty()
    }

    pub fn calendar_configured(&self) -> bool {
        !self.google_calendar_token.is_empty()
    }

    pub fn cloudinary_configured(&self) -> bool {
        !self.cloudinary_cloud_name.is_empty()
            && !self.cloudinary_api_key.is_empty()
            && !self.cloudinary_api_secret.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: ":memory:".to_string(),
            site_url: "http://localhost:3000".to_string(),
            business_name: "Private Chef".to_string(),
            cors_origin: None,
            admin_username: "admin".to_string(),
            admin_password_hash: String::new(),
            admin_password: String::new(),
            admin_email: String::new(),
            session_secret: String::new(),
            session_ttl_hours: 8,
            secure_cookies: false,
            llm_provider: "openai".to_string(),
            llm_api_key: String::new(),
            llm_base_url: "https://api.openai.com/v1".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_from: String::new(),
            smtp_starttls: true,
            google_calendar_id: "primary".to_string(),
            google_calendar_token: String::new(),
            calendar_time_zone: "UTC".to_string(),
            event_duration_hours: 4,
            cloudinary_cloud_name: String::new(),
            cloudinary_api_key: String::new(),
            cloudinary_api_secret: String::new(),
            cloudinary_folder: "chefbook".to_string(),
        }
    }
}
