use std::env;

use crate::error::AppError;

pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mongo_url: Option<String>,
    pub mongo_database: Option<String>,
    pub google_api_key: Option<String>,
    pub geocode_url: String,
    pub geocode_timeout_secs: u64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            port: parse_or_default("PORT", 8080)?,
            mongo_url: non_empty("MONGO_URL"),
            mongo_database: non_empty("MONGO_DATABASE"),
            google_api_key: non_empty("GOOGLE_API_KEY"),
            geocode_url: non_empty("GEOCODE_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODE_URL.to_string()),
            geocode_timeout_secs: parse_or_default("GEOCODE_TIMEOUT_SECS", 10)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: parse_log_format(env::var("LOG_FORMAT").ok().as_deref())?,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("compact") => Ok(LogFormat::Compact),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(AppError::Internal(format!(
            "invalid LOG_FORMAT: {other} (expected compact or json)"
        ))),
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_log_format, LogFormat};

    #[test]
    fn log_format_defaults_to_compact() {
        assert_eq!(parse_log_format(None).unwrap(), LogFormat::Compact);
        assert_eq!(parse_log_format(Some("")).unwrap(), LogFormat::Compact);
        assert_eq!(parse_log_format(Some("json")).unwrap(), LogFormat::Json);
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(parse_log_format(Some("pretty")).is_err());
    }
}
