//! Selection strategy (C2): picks the next node from an ordered candidate
//! snapshot. Round-robin is the only strategy wired into the Router, but
//! the trait leaves room for weighted round-robin or similar without
//! touching C5 (see Open Question 3 in DESIGN.md).

use crate::types::Node;
use std::sync::atomic::{AtomicUsize, Ordering};

pub trait SelectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `None` iff `candidates` is empty. Implementers must not
    /// re-sort candidates — callers provide a stable order and the
    /// strategy's own cursor is what distributes load fairly over time.
    fn select(&self, candidates: &[Node]) -> Option<Node>;
}

/// Round-robin over a process-global monotonic cursor.
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
        }
    }

    /// Test-only hook to reset the cursor between scenarios.
    #[cfg(test)]
    pub fn reset(&self) {
        self.cursor.store(0, Ordering::SeqCst);
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for RoundRobin {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn select(&self, candidates: &[Node]) -> Option<Node> {
        if candidates.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::SeqCst) % candidates.len();
        Some(candidates[index].clone())
    }
}
