use std::env;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub session_db_path: String,
    pub checkout_port: u16,
    pub brand_name: String,
    pub theme_color: String,
    pub request_timeout: Option<Duration>,
    pub session_watch_interval: Duration,
}

impl Config {
    pub fn from_env() -> ClientResult<Self> {
        Ok(Self {
            api_base: env::var("API_BASE")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            session_db_path: env::var("SESSION_DB_PATH")
                .unwrap_or_else(|_| "./data/session.db".to_string()),
            checkout_port: parse_var("CHECKOUT_PORT", "4100")?,
            brand_name: env::var("BRAND_NAME")
                .unwrap_or_else(|_| "House Party".to_string()),
            theme_color: env::var("THEME_COLOR")
                .unwrap_or_else(|_| "#8b5cf6".to_string()),
            request_timeout: match env::var("REQUEST_TIMEOUT_SECS") {
                Ok(raw) => Some(Duration::from_secs(parse_value(
                    "REQUEST_TIMEOUT_SECS",
                    &raw,
                )?)),
                Err(_) => None,
            },
            session_watch_interval: Duration::from_millis(parse_var(
                "SESSION_WATCH_INTERVAL_MS",
                "500",
            )?),
        })
    }

    /// Defaults pointed at an explicit API base, for embedding and tests.
    pub fn with_api_base(api_base: impl Into<String>, session_db_path: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            session_db_path: session_db_path.into(),
            checkout_port: 0,
            brand_name: "House Party".to_string(),
            theme_color: "#8b5cf6".to_string(),
            request_timeout: None,
            session_watch_interval: Duration::from_millis(500),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: &str) -> ClientResult<T> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    parse_value(key, &raw)
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> ClientResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{key} must be a number, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_rejects_garbage() {
        let err = parse_value::<u16>("CHECKOUT_PORT", "abc").unwrap_err();
        assert!(err.to_string().contains("CHECKOUT_PORT"));
        assert_eq!(parse_value::<u16>("CHECKOUT_PORT", " 8080 ").unwrap(), 8080);
    }

    #[test]
    fn explicit_base_has_no_timeout() {
        let config = Config::with_api_base("http://api.test", "/tmp/s.db");
        assert_eq!(config.api_base, "http://api.test");
        assert!(config.request_timeout.is_none());
        assert_eq!(config.checkout_port, 0);
    }
}
