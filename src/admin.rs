//! Admin surface (C6): thin wrappers over the registry for listing, adding,
//! and deleting nodes, plus a metrics snapshot. No authentication at this
//! layer — that is left to whatever sits in front of the gateway.

use crate::registry::NodeRegistry;
use crate::types::{Endpoint, HealthStatus, Node, NodeId, Scheme};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct NodeView {
    pub id: String,
    pub endpoint: String,
    pub health: HealthStatus,
}

impl From<Node> for NodeView {
    fn from(node: Node) -> Self {
        Self {
            id: node.id.as_str().to_string(),
            endpoint: node.endpoint.to_string(),
            health: node.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PerNodeMetrics {
    pub id: String,
    pub endpoint: String,
    pub health: HealthStatus,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
    pub per_node: Vec<PerNodeMetrics>,
}

pub fn list_nodes(registry: &NodeRegistry) -> Vec<NodeView> {
    registry.find_all().into_iter().map(NodeView::from).collect()
}

/// Admits `{id, host, port}` as a new node with status HEALTHY. Replaces
/// any existing node with the same id.
pub fn add_node(registry: &NodeRegistry, id: &str, host: &str, port: u16) -> Result<(), String> {
    let node_id = NodeId::new(id)?;
    let endpoint = Endpoint::new(Scheme::Http, host, port)?;
    registry.save(Node::new(node_id, endpoint));
    Ok(())
}

pub fn delete_node(registry: &NodeRegistry, id: &str) -> Result<bool, String> {
    let node_id = NodeId::new(id)?;
    Ok(registry.delete(&node_id))
}

pub fn metrics_snapshot(registry: &NodeRegistry) -> MetricsSnapshot {
    let nodes = registry.find_all();
    let available = nodes.iter().filter(|n| n.status.is_usable()).count();
    let per_node = nodes
        .iter()
        .map(|n| PerNodeMetrics {
            id: n.id.as_str().to_string(),
            endpoint: n.endpoint.to_string(),
            health: n.status,
            available: n.status.is_usable(),
        })
        .collect();

    MetricsSnapshot {
        total: nodes.len(),
        available,
        unavailable: nodes.len() - available,
        per_node,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_list_roundtrips() {
        let registry = NodeRegistry::new();
        add_node(&registry, "n1", "localhost", 8545).unwrap();
        let nodes = list_nodes(&registry);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "n1");
        assert_eq!(nodes[0].health, HealthStatus::Healthy);
    }

    #[test]
    fn delete_reports_presence() {
        let registry = NodeRegistry::new();
        add_node(&registry, "n1", "localhost", 8545).unwrap();
        assert!(delete_node(&registry, "n1").unwrap());
        assert!(!delete_node(&registry, "n1").unwrap());
    }

    #[test]
    fn metrics_snapshot_counts_usable_nodes() {
        let registry = NodeRegistry::new();
        add_node(&registry, "n1", "localhost", 8545).unwrap();
        add_node(&registry, "n2", "localhost", 8546).unwrap();
        registry.update_health_status(
            &NodeId::new("n2").unwrap(),
            HealthStatus::Unhealthy,
            "test",
        );

        let snapshot = metrics_snapshot(&registry);
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.available, 1);
        assert_eq!(snapshot.unavailable, 1);
    }
}
