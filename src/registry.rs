//! Concurrent node registry (C1).
//!
//! Backed by `parking_lot::RwLock` over a `HashMap` — readers proceed in
//! parallel, writes serialize against each other, and every read observes a
//! whole `Node` value, never a partially updated one, because the map
//! stores values by clone-out rather than by interior-mutable reference.

use crate::types::{HealthStatus, Node, NodeHealthChangedEvent, NodeId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Instant;

pub struct NodeRegistry {
    nodes: RwLock<HashMap<NodeId, Node>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Upserts a node by id. Re-saving the same id replaces the record.
    pub fn save(&self, node: Node) {
        self.nodes.write().insert(node.id.clone(), node);
    }

    pub fn find_by_id(&self, id: &NodeId) -> Option<Node> {
        self.nodes.read().get(id).cloned()
    }

    /// Immutable snapshot of all records at call time. Order is the map's
    /// iteration order — unspecified but stable within this one call.
    pub fn find_all(&self) -> Vec<Node> {
        self.nodes.read().values().cloned().collect()
    }

    /// Equivalent to `find_all().filter(is_usable)`, read under a single
    /// lock acquisition so no node is duplicated or lost relative to one
    /// snapshot.
    pub fn find_available(&self) -> Vec<Node> {
        self.nodes
            .read()
            .values()
            .filter(|n| n.status.is_usable())
            .cloned()
            .collect()
    }

    pub fn delete(&self, id: &NodeId) -> bool {
        self.nodes.write().remove(id).is_some()
    }

    pub fn exists(&self, id: &NodeId) -> bool {
        self.nodes.read().contains_key(id)
    }

    /// Applies a health transition for one node, returning an event iff the
    /// status actually changed. This is the single place that mutates a
    /// node's `status` outside of admission — the Router never writes here.
    pub fn update_health_status(
        &self,
        id: &NodeId,
        new_status: HealthStatus,
        reason: &str,
    ) -> Option<NodeHealthChangedEvent> {
        let mut nodes = self.nodes.write();
        let node = nodes.get_mut(id)?;
        let previous_status = node.status;
        if previous_status == new_status {
            return None;
        }
        node.status = new_status;
        Some(NodeHealthChangedEvent {
            node_id: id.clone(),
            previous_status,
            new_status,
            reason: reason.to_string(),
            occurred_at: Instant::now(),
        })
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Endpoint, Scheme};

    fn node(id: &str) -> Node {
        Node::new(
            NodeId::new(id).unwrap(),
            Endpoint::new(Scheme::Http, "localhost", 8080).unwrap(),
        )
    }

    #[test]
    fn save_upserts_by_id() {
        let registry = NodeRegistry::new();
        registry.save(node("n1"));
        registry.save(node("n1"));
        assert_eq!(registry.find_all().len(), 1);
    }

    #[test]
    fn delete_removes_present_and_reports_absent() {
        let registry = NodeRegistry::new();
        registry.save(node("n1"));
        assert!(registry.delete(&NodeId::new("n1").unwrap()));
        assert!(!registry.delete(&NodeId::new("n1").unwrap()));
        assert!(!registry.exists(&NodeId::new("n1").unwrap()));
    }

    #[test]
    fn find_available_filters_unhealthy() {
        let registry = NodeRegistry::new();
        registry.save(node("n1"));
        registry.save(node("n2"));
        let id2 = NodeId::new("n2").unwrap();
        registry.update_health_status(&id2, HealthStatus::Unhealthy, "test");

        let available = registry.find_available();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, NodeId::new("n1").unwrap());
    }

    #[test]
    fn update_health_status_emits_event_only_on_transition() {
        let registry = NodeRegistry::new();
        registry.save(node("n1"));
        let id = NodeId::new("n1").unwrap();

        // Same status: no event.
        assert!(
            registry
                .update_health_status(&id, HealthStatus::Healthy, "noop")
                .is_none()
        );

        // Different status: event with correct prev/new.
        let event = registry
            .update_health_status(&id, HealthStatus::Unhealthy, "probe failed")
            .expect("expected a transition event");
        assert_eq!(event.previous_status, HealthStatus::Healthy);
        assert_eq!(event.new_status, HealthStatus::Unhealthy);

        // Repeating the same new status again: no event.
        assert!(
            registry
                .update_health_status(&id, HealthStatus::Unhealthy, "probe failed")
                .is_none()
        );
    }

    #[test]
    fn update_health_status_on_unknown_id_is_a_noop() {
        let registry = NodeRegistry::new();
        let missing = NodeId::new("ghost").unwrap();
        assert!(
            registry
                .update_health_status(&missing, HealthStatus::Unhealthy, "test")
                .is_none()
        );
    }
}
