//! Environment-driven settings (`HOST`, `PORT`, `DATA_PATH`, `AUTH_TOKENS`).

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::auth::NAMESPACE_SEPARATOR;

/// Settings the server runs with.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Interface to bind
    pub host: String,
    /// Listening port, 8080 unless `PORT` says otherwise
    pub port: u16,
    /// Snapshot file backing the store, if any
    pub data_path: Option<PathBuf>,
    /// Access token to namespace; empty means anonymous access
    pub tokens: HashMap<String, String>,
}

impl Config {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let data_path = env::var("DATA_PATH")
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let tokens = match env::var("AUTH_TOKENS") {
            Ok(raw) => parse_tokens(&raw)?,
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            host,
            port,
            data_path,
            tokens,
        })
    }

    /// Whether requests must carry a known token.
    pub fn requires_auth(&self) -> bool {
        !self.tokens.is_empty()
    }
}

/// Parse `token:namespace` pairs separated by commas.
///
/// A namespace may not contain the separator used to qualify kinds, or two
/// namespaces could produce the same qualified kind.
pub fn parse_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((_, namespace)) if namespace.contains(NAMESPACE_SEPARATOR) => {
                Err(ConfigError::InvalidNamespace(namespace.to_string()))
            }
            Some((token, namespace)) if !token.is_empty() && !namespace.is_empty() => {
                Ok((token.to_string(), namespace.to_string()))
            }
            _ => Err(ConfigError::InvalidToken(entry.to_string())),
        })
        .collect()
}

/// Rejected environment values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid AUTH_TOKENS entry: {0}")]
    InvalidToken(String),

    #[error("Invalid namespace {0:?}: must not contain \"--\"")]
    InvalidNamespace(String),
}
