//! Configuration management for the bridge server

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::store::sqlite::DEFAULT_MAX_RESULTS;
use crate::store::LibraryId;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub bridge: BridgeConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Cap on the ids one store search returns
    pub max_results: usize,
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Library every request is scoped to
    pub library_id: LibraryId,
    /// Upper bound on a single bridge operation
    pub request_timeout: Duration,
    /// Consult the citation-key index before scanning `extra` fields
    pub citekey_index: bool,
    /// Reported by the ping endpoint
    pub host_version: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 23119,
            },
            database: DatabaseConfig {
                url: "sqlite:./refbridge.db".to_string(),
                max_results: DEFAULT_MAX_RESULTS,
            },
            bridge: BridgeConfig {
                library_id: LibraryId::USER,
                request_timeout: Duration::from_secs(30),
                citekey_index: true,
                host_version: "standalone".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_results: parse_var("STORE_MAX_RESULTS", defaults.database.max_results)?,
            },
            bridge: BridgeConfig {
                library_id: LibraryId(parse_var("LIBRARY_ID", defaults.bridge.library_id.0)?),
                request_timeout: Duration::from_secs(parse_var(
                    "REQUEST_TIMEOUT_SECS",
                    defaults.bridge.request_timeout.as_secs(),
                )?),
                citekey_index: parse_var("CITEKEY_INDEX", defaults.bridge.citekey_index)?,
                host_version: env::var("HOST_VERSION").unwrap_or(defaults.bridge.host_version),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 23119);
        assert_eq!(config.bridge.library_id, LibraryId::USER);
        assert_eq!(config.bridge.request_timeout, Duration::from_secs(30));
        assert!(config.bridge.citekey_index);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("REFBRIDGE_TEST_PORT", "not-a-port");
        let result = parse_var::<u16>("REFBRIDGE_TEST_PORT", 1);
        env::remove_var("REFBRIDGE_TEST_PORT");

        assert!(matches!(result, Err(ConfigError::Invalid { var: "REFBRIDGE_TEST_PORT", .. })));
        assert_eq!(parse_var::<u16>("REFBRIDGE_TEST_UNSET", 7).unwrap(), 7);
    }
}
