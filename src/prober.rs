//! Health prober (C4): periodically and in parallel probes every registered
//! node and writes the derived status back into the registry. Runs as a
//! single cancellable background task.

use crate::registry::NodeRegistry;
use crate::types::{determine_status, HealthProbeResult, Node};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time;

pub struct HealthProber {
    http: Client,
    path: String,
    timeout: Duration,
}

impl HealthProber {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            path: path.into(),
            timeout,
        }
    }

    /// Issues one GET to `node`'s health path with the configured timeout.
    pub async fn probe(&self, node: &Node) -> HealthProbeResult {
        let url = node.endpoint.to_url(&self.path);
        let start = Instant::now();
        match self.http.get(&url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => HealthProbeResult::Success {
                latency: start.elapsed(),
            },
            Ok(response) => HealthProbeResult::Failure {
                error: format!("HTTP {}", response.status().as_u16()),
                latency: start.elapsed(),
            },
            Err(e) => HealthProbeResult::Failure {
                error: describe_error(&e),
                latency: Duration::ZERO,
            },
        }
    }

    /// Spawns the background loop: snapshot, fan out probes in parallel,
    /// await the whole batch, write results back, sleep, repeat.
    ///
    /// The returned handle can be `.abort()`ed for cooperative shutdown —
    /// the in-flight sleep or probe batch is interrupted and the loop exits
    /// without further writes.
    pub fn start(self: Arc<Self>, registry: Arc<NodeRegistry>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            loop {
                ticker.tick().await;

                let snapshot = registry.find_all();
                let probes = snapshot.iter().map(|node| {
                    let prober = Arc::clone(&self);
                    let node = node.clone();
                    async move {
                        let result = prober.probe(&node).await;
                        (node.id, determine_status(&result))
                    }
                });
                let results = futures::future::join_all(probes).await;

                for (id, new_status) in results {
                    if let Some(event) =
                        registry.update_health_status(&id, new_status, "Health check result")
                    {
                        tracing::info!(
                            node_id = %event.node_id,
                            previous_status = %event.previous_status,
                            new_status = %event.new_status,
                            reason = %event.reason,
                            "node health changed"
                        );
                    }
                }
            }
        })
    }
}

fn describe_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connect exception: {err}")
    } else {
        format!("request failed: {err}")
    }
}
