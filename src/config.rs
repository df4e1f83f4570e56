//! Process configuration.
//!
//! Everything is read from environment variables once at startup and passed
//! into constructors explicitly; nothing in the crate reaches for the
//! environment after boot, so tests can build a `Config` by hand.

use std::time::Duration;

use anyhow::Context;

const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Bearer credential for the completion provider.
    pub api_key: String,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Chat-completions endpoint URL.
    pub completion_url: String,
    /// Per-request timeout for outbound completion calls.
    pub request_timeout: Duration,
}

impl Config {
    /// Build a configuration from environment variables.
    ///
    /// - `COMPLETION_API_KEY` (or `OPENAI_API_KEY`) - required
    /// - `COMPLETION_MODEL` - defaults to `gpt-4o-mini`
    /// - `COMPLETION_API_URL` - defaults to the OpenAI chat endpoint
    /// - `COMPLETION_TIMEOUT_SECS` - defaults to 60
    /// - `HOST` / `PORT` - default to `0.0.0.0:8080`
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("COMPLETION_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .context("COMPLETION_API_KEY or OPENAI_API_KEY must be set")?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().context("PORT must be a valid port number")?,
            Err(_) => 8080,
        };

        let timeout_secs = match std::env::var("COMPLETION_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("COMPLETION_TIMEOUT_SECS must be a number of seconds")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            api_key,
            model: std::env::var("COMPLETION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            completion_url: std::env::var("COMPLETION_API_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
