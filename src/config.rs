use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Sessions
    pub jwt_secret: String,
    pub session_ttl_days: i64,

    // Web Server
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub public_base_url: String,

    // Storage
    pub storage_dir: PathBuf,
    pub max_media_bytes: usize,
    pub max_avatar_bytes: usize,

    // AI
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_env_u16("PORT", 3000)?;
        Ok(Self {
            database_url: required_env("DATABASE_URL")?,

            jwt_secret: required_env("JWT_SECRET")?,
            session_ttl_days: parse_env_i64("SESSION_TTL_DAYS", 7)?,

            host: env_or_default("HOST", "0.0.0.0"),
            port,
            static_dir: PathBuf::from(env_or_default("STATIC_DIR", "./dist")),
            public_base_url: env_or_default("PUBLIC_BASE_URL", &format!("http://localhost:{port}"))
                .trim_end_matches('/')
                .to_string(),

            storage_dir: PathBuf::from(env_or_default("STORAGE_DIR", "./storage")),
            max_media_bytes: parse_env_usize("MAX_MEDIA_BYTES", 5 * 1024 * 1024)?,
            max_avatar_bytes: parse_env_usize("MAX_AVATAR_BYTES", 2 * 1024 * 1024)?,

            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_api_url: env_or_default(
                "GEMINI_API_URL",
                "https://generativelanguage.googleapis.com",
            ),

            log_format: parse_log_format(&env_or_default("LOG_FORMAT", "pretty"))?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "JWT_SECRET".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_DAYS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_media_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_MEDIA_BYTES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_avatar_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_AVATAR_BYTES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_i64(name: &str, default: i64) -> Result<i64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::InvalidValue {
            name: "LOG_FORMAT".to_string(),
            message: format!("expected 'pretty' or 'json', got '{other}'"),
        }),
    }
}
