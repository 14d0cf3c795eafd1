//! Request router (C5): the per-request forwarding pipeline with bounded
//! retries across distinct nodes. The heart of the core.

use crate::client::BackendClient;
use crate::registry::NodeRegistry;
use crate::strategy::SelectionStrategy;
use crate::types::{ForwardResult, NodeId, RequestResult};
use reqwest::Method;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Transport-error substrings that make a failure worth retrying on a
/// different node. Matched case-insensitively.
const RETRYABLE_KEYWORDS: &[&str] = &[
    "timeout",
    "timed out",
    "connection refused",
    "connection reset",
    "connect exception",
    "socket timeout",
    "no route to host",
    "connection closed",
];

pub fn is_retryable(error: &str) -> bool {
    let lower = error.to_lowercase();
    RETRYABLE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

pub struct Router {
    registry: Arc<NodeRegistry>,
    strategy: Arc<dyn SelectionStrategy>,
    client: BackendClient,
    request_timeout: Duration,
    max_attempts: usize,
}

impl Router {
    pub fn new(
        registry: Arc<NodeRegistry>,
        strategy: Arc<dyn SelectionStrategy>,
        client: BackendClient,
        request_timeout: Duration,
        max_attempts: usize,
    ) -> Self {
        Self {
            registry,
            strategy,
            client,
            request_timeout,
            max_attempts,
        }
    }

    /// Routes one inbound request, retrying across distinct nodes on
    /// transport-retryable failures up to `max_attempts` times.
    ///
    /// `cancellation` is a child of the server's shutdown token (see
    /// `http::AppState`): it fires when the process is shutting down, so an
    /// in-flight forward is cancelled rather than left to run out its full
    /// timeout while nothing is left to read the response.
    pub async fn handle(
        &self,
        path: &str,
        method: Method,
        headers: reqwest::header::HeaderMap,
        body: Option<Vec<u8>>,
        cancellation: CancellationToken,
    ) -> RequestResult {
        let mut excluded: HashSet<NodeId> = HashSet::new();

        for attempt in 1..=self.max_attempts {
            let candidates: Vec<_> = self
                .registry
                .find_available()
                .into_iter()
                .filter(|n| !excluded.contains(&n.id))
                .collect();

            if candidates.is_empty() {
                return RequestResult::NoAvailableNodes;
            }

            let pick = match self.strategy.select(&candidates) {
                Some(node) => node,
                None => return RequestResult::SelectionFailed,
            };

            let forward = self.client.forward(
                &pick,
                path,
                method.clone(),
                headers.clone(),
                body.clone(),
                self.request_timeout,
            );

            let result = tokio::select! {
                result = forward => result,
                _ = cancellation.cancelled() => {
                    return RequestResult::RequestFailed {
                        error: "cancelled".to_string(),
                    };
                }
            };

            match result {
                ForwardResult::Success {
                    status,
                    latency,
                    body,
                } => {
                    return RequestResult::Success {
                        node_id: pick.id,
                        status,
                        latency,
                        body,
                    };
                }
                ForwardResult::Failure { error } => {
                    if is_retryable(&error) && attempt < self.max_attempts {
                        excluded.insert(pick.id);
                        continue;
                    }
                    return RequestResult::RequestFailed { error };
                }
            }
        }

        RequestResult::RequestFailed {
            error: "All retry attempts exhausted".to_string(),
        }
    }
}
