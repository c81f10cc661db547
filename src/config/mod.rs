use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub api: ApiConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub session: SessionConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

// Настройки REST API бэкенда
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Где хранится текущий пользователь между запусками
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub storage_path: PathBuf,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Собирает конфигурацию из произвольного источника пар ключ/значение.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("MYSEAT_API_URL")
            .unwrap_or_else(|| "http://localhost:8080/api".to_string());

        Ok(Config {
            app: AppConfig {
                environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
                rust_log: lookup("RUST_LOG").unwrap_or_else(|| "myseat_client=info".to_string()),
                log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
            },
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout_seconds: parse_or(&lookup, "API_TIMEOUT_SECONDS", 10)?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parse_or(&lookup, "CIRCUIT_BREAKER_FAILURE_THRESHOLD", 5)?,
                timeout_seconds: parse_or(&lookup, "CIRCUIT_BREAKER_TIMEOUT_SECONDS", 30)?,
            },
            session: SessionConfig {
                storage_path: lookup("MYSEAT_SESSION_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".myseat_session.json")),
            },
        })
    }

    pub fn with_api_url(mut self, base_url: &str) -> Self {
        self.api.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.app.log_format, LogFormat::Pretty);
        assert_eq!(config.session.storage_path, PathBuf::from(".myseat_session.json"));
    }

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let config =
            Config::from_lookup(lookup_from(&[("MYSEAT_API_URL", "https://tickets.example/api/")]))
                .unwrap();
        assert_eq!(config.api.base_url, "https://tickets.example/api");

        let config = config.with_api_url("http://127.0.0.1:9000/");
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn invalid_number_is_reported_with_its_key() {
        let err = Config::from_lookup(lookup_from(&[("API_TIMEOUT_SECONDS", "soon")])).unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, "API_TIMEOUT_SECONDS");
                assert_eq!(value, "soon");
            }
        }
    }

    #[test]
    fn json_log_format_is_recognised() {
        let config = Config::from_lookup(lookup_from(&[("LOG_FORMAT", "JSON")])).unwrap();
        assert_eq!(config.app.log_format, LogFormat::Json);
    }
}
