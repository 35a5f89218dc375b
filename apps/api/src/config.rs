use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Built once in `main` and handed to every component that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Redis list holding pending evaluation jobs.
    pub evaluation_queue: String,
    pub evaluation_workers: usize,
    /// Shared deadline for all external calls of a single evaluation job.
    pub evaluation_timeout: Duration,
    /// How long a worker blocks on the queue before polling again.
    pub queue_poll: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            evaluation_queue: std::env::var("EVALUATION_QUEUE")
                .unwrap_or_else(|_| "evaluation_jobs".to_string()),
            evaluation_workers: parse_env("EVALUATION_WORKERS", 2)?,
            evaluation_timeout: Duration::from_secs(parse_env("EVALUATION_TIMEOUT_SECS", 300)?),
            queue_poll: Duration::from_secs(parse_env("QUEUE_POLL_SECS", 5)?),
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
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
