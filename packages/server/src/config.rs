use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage_url: String,
    pub storage_bucket: String,
    pub storage_service_key: String,
    pub site_url: String,
    pub newsletter_auto_send: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            storage_url: env::var("STORAGE_URL").context("STORAGE_URL must be set")?,
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "images".to_string()),
            storage_service_key: env::var("STORAGE_SERVICE_KEY")
                .context("STORAGE_SERVICE_KEY must be set")?,
            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            newsletter_auto_send: env::var("NEWSLETTER_AUTO_SEND")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}
