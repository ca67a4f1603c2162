use std::{env, time::Duration};

use url::Url;

use crate::error::AppError;

/// Quiet period between the last local edit and the outbound sync.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: Url,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Pre-issued bearer token; wins over email/password when both are set.
    pub auth_token: Option<String>,
    pub debounce: Duration,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let api_base = env::var("TRIPMATE_API_BASE")
            .unwrap_or_else(|_| "https://tripmate-api.local".to_string());
        let api_base = Url::parse(&api_base)
            .map_err(|err| AppError::Config(format!("invalid TRIPMATE_API_BASE: {err}")))?;

        let debounce_ms = parse_ms("TRIPMATE_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?;
        let timeout_ms = parse_ms("TRIPMATE_REQUEST_TIMEOUT_MS", 10_000)?;

        Ok(Self {
            api_base,
            email: env::var("TRIPMATE_EMAIL").ok(),
            password: env::var("TRIPMATE_PASSWORD").ok(),
            auth_token: env::var("TRIPMATE_TOKEN").ok(),
            debounce: Duration::from_millis(debounce_ms),
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn parse_ms(key: &str, default: u64) -> Result<u64, AppError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {key}: {err}"))),
    }
}
