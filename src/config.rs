//! Runtime configuration read from the environment (and `.env`).

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CART_STORE_PATH: &str = "bakery-cart.json";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    NotANumber { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Without a database the built-in catalog is served.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub cart_store_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            database_url: get("DATABASE_URL"),
            max_connections: parse_or(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            cart_store_path: get("CART_STORE_PATH").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_CART_STORE_PATH)),
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::NotANumber { key, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_url, None);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.cart_store_path, PathBuf::from(DEFAULT_CART_STORE_PATH));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/bakery"),
            ("CART_STORE_PATH", "/tmp/cart.json"),
            ("DATABASE_MAX_CONNECTIONS", " 12 "),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/bakery"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.cart_store_path, PathBuf::from("/tmp/cart.json"));
    }

    #[test]
    fn test_blank_database_url_means_none() {
        assert_eq!(config(&[("DATABASE_URL", "  ")]).unwrap().database_url, None);
    }

    #[test]
    fn test_bad_port() {
        assert_eq!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::NotANumber { key: "PORT", value: "eighty".into() })
        );
    }
}
