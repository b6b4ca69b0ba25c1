//! Broker configuration, read from environment variables.
//!
//!   BROKER_BIND_ADDR              - listen address (default: 0.0.0.0:$PORT)
//!   PORT                          - listen port when BROKER_BIND_ADDR is unset (default: 8080)
//!   DATABASE_URL                  - Postgres connection string
//!   DATABASE_POOL_SIZE            - max pool connections (default: 10)
//!   DATABASE_CONNECT_TIMEOUT_SECS - pool acquire timeout (default: 30)

use std::str::FromStr;
use std::time::Duration;

use crate::error::BrokerError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "postgresql://localhost:5432/servicebroker";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl BrokerConfig {
    pub fn from_env() -> Result<Self, BrokerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BrokerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BROKER_BIND_ADDR") {
            Some(addr) => addr,
            None => {
                let port: u16 = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
                format!("0.0.0.0:{port}")
            }
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_or(get("DATABASE_POOL_SIZE"), "DATABASE_POOL_SIZE", 10)?,
            connect_timeout: Duration::from_secs(parse_or(
                get("DATABASE_CONNECT_TIMEOUT_SECS"),
                "DATABASE_CONNECT_TIMEOUT_SECS",
                30,
            )?),
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, BrokerError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BrokerError::Config(format!("{key} has invalid value {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<BrokerConfig, BrokerError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BrokerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn port_feeds_bind_addr() {
        let cfg = config(&[("PORT", "9090")]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:9090");
    }

    #[test]
    fn explicit_bind_addr_wins_over_port() {
        let cfg = config(&[("BROKER_BIND_ADDR", "127.0.0.1:4000"), ("PORT", "9090")]).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:4000");
    }

    #[test]
    fn empty_value_counts_as_unset() {
        let cfg = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn invalid_number_is_config_error() {
        let err = config(&[("DATABASE_POOL_SIZE", "lots")]).unwrap_err();
        assert!(matches!(err, BrokerError::Config(_)));
        assert!(err.to_string().contains("DATABASE_POOL_SIZE"));
    }
}
