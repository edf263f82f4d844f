use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub from_address: String,
    pub from_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    /// Public base URL, used to build links in outgoing mail.
    pub app_url: String,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let app_url = std::env::var("APP_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "http://localhost:8080".into());
        let mail = MailConfig {
            from_address: std::env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@expenses.local".into()),
            from_name: std::env::var("MAIL_FROM_NAME")
                .unwrap_or_else(|_| "Expense Tracker".into()),
        };
        Ok(Self {
            database_url,
            database_max_connections,
            app_url,
            mail,
        })
    }
}
