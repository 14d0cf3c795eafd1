//! Typed configuration, loaded from environment variables with defaults.
//!
//! Mirrors the tunables enumerated in the routing/health specification:
//! server bind address, per-request timeout and retry budget, and the
//! health-prober's interval/timeout/path. The backend node list is read
//! from `BACKEND_NODES` when set and falls back to a small built-in
//! default list otherwise.

use crate::error::GatewayError;
use crate::types::{Endpoint, Scheme};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub request_timeout: Duration,
    pub max_attempts: usize,
    pub health_check_enabled: bool,
    pub health_check_interval: Duration,
    pub health_check_timeout: Duration,
    pub health_check_path: String,
    pub backend_nodes: Vec<(String, String, u16)>,
}

const DEFAULT_NODES: &[(&str, u16)] = &[
    ("localhost", 8545),
    ("localhost", 8546),
    ("localhost", 8547),
];

impl Config {
    /// Loads configuration from the process environment, falling back to
    /// defaults for anything unset. Malformed (as opposed to absent)
    /// values are a hard error.
    pub fn from_env() -> Result<Self, GatewayError> {
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = parse_env("SERVER_PORT", 8080)?;
        let request_timeout = Duration::from_millis(parse_env("REQUEST_TIMEOUT_MS", 5000)?);
        let max_attempts: usize = parse_env("REQUEST_MAX_ATTEMPTS", 3)?;
        if max_attempts < 1 {
            return Err(GatewayError::Config(
                "REQUEST_MAX_ATTEMPTS must be >= 1".to_string(),
            ));
        }
        let health_check_enabled = parse_env_bool("HEALTH_CHECK_ENABLED", true)?;
        let health_check_interval =
            Duration::from_millis(parse_env("HEALTH_CHECK_INTERVAL_MS", 10_000)?);
        let health_check_timeout =
            Duration::from_millis(parse_env("HEALTH_CHECK_TIMEOUT_MS", 500)?);
        let health_check_path =
            env::var("HEALTH_CHECK_PATH").unwrap_or_else(|_| "/health".to_string());

        let backend_nodes = match env::var("BACKEND_NODES") {
            Ok(raw) if !raw.trim().is_empty() => parse_backend_nodes(&raw)?,
            _ => DEFAULT_NODES
                .iter()
                .enumerate()
                .map(|(i, (host, port))| (format!("node-{}", i + 1), host.to_string(), *port))
                .collect(),
        };

        Ok(Self {
            server_host,
            server_port,
            request_timeout,
            max_attempts,
            health_check_enabled,
            health_check_interval,
            health_check_timeout,
            health_check_path,
            backend_nodes,
        })
    }

    /// Builds `(NodeId, Endpoint)` pairs ready for registry admission.
    pub fn bootstrap_endpoints(&self) -> Result<Vec<(String, Endpoint)>, GatewayError> {
        self.backend_nodes
            .iter()
            .map(|(id, host, port)| {
                Endpoint::new(Scheme::Http, host.clone(), *port)
                    .map(|ep| (id.clone(), ep))
                    .map_err(GatewayError::Config)
            })
            .collect()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, GatewayError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| GatewayError::Config(format!("{key} is not valid: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn parse_env_bool(key: &str, default: bool) -> Result<bool, GatewayError> {
    match env::var(key) {
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(GatewayError::Config(format!(
                "{key} is not a valid boolean: {raw}"
            ))),
        },
        Err(_) => Ok(default),
    }
}

/// Parses `host1:port1,host2:port2,...` into `(id, host, port)` triples,
/// assigning ids `node-<1-based-index>` per the spec.
fn parse_backend_nodes(raw: &str) -> Result<Vec<(String, String, u16)>, GatewayError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(i, entry)| {
            let (host, port) = entry.rsplit_once(':').ok_or_else(|| {
                GatewayError::Config(format!("BACKEND_NODES entry missing port: {entry}"))
            })?;
            let port: u16 = port.parse().map_err(|_| {
                GatewayError::Config(format!("BACKEND_NODES entry has invalid port: {entry}"))
            })?;
            if host.is_empty() {
                return Err(GatewayError::Config(format!(
                    "BACKEND_NODES entry missing host: {entry}"
                )));
            }
            Ok((format!("node-{}", i + 1), host.to_string(), port))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_nodes_with_sequential_ids() {
        let nodes = parse_backend_nodes("host1:8545,host2:8546").unwrap();
        assert_eq!(
            nodes,
            vec![
                ("node-1".to_string(), "host1".to_string(), 8545),
                ("node-2".to_string(), "host2".to_string(), 8546),
            ]
        );
    }

    #[test]
    fn rejects_entry_without_port() {
        assert!(parse_backend_nodes("host1").is_err());
    }

    #[test]
    fn rejects_entry_with_bad_port() {
        assert!(parse_backend_nodes("host1:notaport").is_err());
    }
}
