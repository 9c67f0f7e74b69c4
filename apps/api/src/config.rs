use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Messages API host; overridable for proxies and local stand-ins.
    pub anthropic_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Generation requests allowed per user per window.
    pub llm_rate_limit: u32,
    pub llm_rate_window: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_rate_limit: parse_env("LLM_RATE_LIMIT", 20)?,
            llm_rate_window: Duration::from_secs(parse_env("LLM_RATE_WINDOW_SECS", 3600)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_override() {
        std::env::remove_var("FOLIO_TEST_UNSET");
        assert_eq!(parse_env::<u16>("FOLIO_TEST_UNSET", 8080).unwrap(), 8080);

        std::env::set_var("FOLIO_TEST_LIMIT", " 5 ");
        assert_eq!(parse_env::<u32>("FOLIO_TEST_LIMIT", 20).unwrap(), 5);

        std::env::set_var("FOLIO_TEST_PORT", "eighty");
        assert!(parse_env::<u16>("FOLIO_TEST_PORT", 8080).is_err());
    }
}
