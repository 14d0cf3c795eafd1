//! Core data model: node identity, endpoints, health status, and the
//! tagged results that flow between components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Non-empty opaque identifier for a registered backend node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Builds a NodeId, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("node id must not be empty".to_string());
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL scheme of an upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// Address of a backend node: scheme, host, and port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Result<Self, String> {
        let host = host.into();
        if host.is_empty() {
            return Err("endpoint host must not be empty".to_string());
        }
        Ok(Self { scheme, host, port })
    }

    /// Renders this endpoint plus a path suffix as a full request URL.
    pub fn to_url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}://{}:{}/{}", self.scheme, self.host, self.port, path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Health classification of a node, as maintained by the prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// A node is usable for routing unless it has been marked unhealthy.
    pub fn is_usable(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => f.write_str("HEALTHY"),
            HealthStatus::Degraded => f.write_str("DEGRADED"),
            HealthStatus::Unhealthy => f.write_str("UNHEALTHY"),
        }
    }
}

/// A registered backend node. Only the registry mutates `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub endpoint: Endpoint,
    pub status: HealthStatus,
}

impl Node {
    /// A freshly admitted node always starts HEALTHY.
    pub fn new(id: NodeId, endpoint: Endpoint) -> Self {
        Self {
            id,
            endpoint,
            status: HealthStatus::Healthy,
        }
    }
}

/// Emitted by the registry iff a health update changes a node's status.
#[derive(Debug, Clone)]
pub struct NodeHealthChangedEvent {
    pub node_id: NodeId,
    pub previous_status: HealthStatus,
    pub new_status: HealthStatus,
    pub reason: String,
    pub occurred_at: Instant,
}

/// Outcome of a single probe to a node's health endpoint.
#[derive(Debug, Clone)]
pub enum HealthProbeResult {
    Success { latency: Duration },
    Failure { error: String, latency: Duration },
}

/// Latency under this threshold on a successful probe keeps a node HEALTHY;
/// at or above it the node is DEGRADED but still usable. Not derived from
/// config — see DESIGN.md Open Question 2.
pub const HEALTHY_LATENCY_THRESHOLD: Duration = Duration::from_millis(50);

/// Pure mapping from a probe outcome to the resulting health status.
pub fn determine_status(result: &HealthProbeResult) -> HealthStatus {
    match result {
        HealthProbeResult::Success { latency } if *latency < HEALTHY_LATENCY_THRESHOLD => {
            HealthStatus::Healthy
        }
        HealthProbeResult::Success { .. } => HealthStatus::Degraded,
        HealthProbeResult::Failure { .. } => HealthStatus::Unhealthy,
    }
}

/// Outcome of a single outbound forward attempt to a node.
#[derive(Debug, Clone)]
pub enum ForwardResult {
    Success {
        status: u16,
        latency: Duration,
        body: Vec<u8>,
    },
    Failure {
        error: String,
    },
}

/// Outward-facing outcome of routing one client request.
#[derive(Debug, Clone)]
pub enum RequestResult {
    Success {
        node_id: NodeId,
        status: u16,
        latency: Duration,
        body: Vec<u8>,
    },
    RequestFailed {
        error: String,
    },
    NoAvailableNodes,
    SelectionFailed,
}
