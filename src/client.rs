//! Backend client (C3): issues one outbound HTTP call to a specified node
//! and reports the outcome as a tagged [`ForwardResult`]. Performs no
//! retries and makes no health decisions — that is the Router's and the
//! Prober's job respectively.

use crate::types::{ForwardResult, Node};
use reqwest::Method;
use std::time::{Duration, Instant};

pub struct BackendClient {
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Forwards one request to `node`, applying `timeout` to the whole
    /// exchange (connect + send + receive).
    pub async fn forward(
        &self,
        node: &Node,
        path: &str,
        method: Method,
        mut headers: reqwest::header::HeaderMap,
        body: Option<Vec<u8>>,
        timeout: Duration,
    ) -> ForwardResult {
        let url = node.endpoint.to_url(path);
        let has_body = body.is_some() && method_permits_body(&method);

        // Strip any Content-Type the caller already copied through — reqwest's
        // `header()` appends rather than overwrites, so without this a body
        // request would carry two Content-Type headers.
        if has_body {
            headers.remove(reqwest::header::CONTENT_TYPE);
        }

        let mut builder = self
            .http
            .request(method, &url)
            .headers(headers)
            .timeout(timeout);

        if has_body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.unwrap_or_default());
        }

        let start = Instant::now();
        match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(body) => ForwardResult::Success {
                        status,
                        latency: start.elapsed(),
                        body: body.to_vec(),
                    },
                    Err(e) => ForwardResult::Failure {
                        error: describe_error(&e),
                    },
                }
            }
            Err(e) => ForwardResult::Failure {
                error: describe_error(&e),
            },
        }
    }
}

impl Default for BackendClient {
    fn default() -> Self {
        Self::new()
    }
}

fn method_permits_body(method: &Method) -> bool {
    !matches!(method, &Method::GET | &Method::HEAD)
}

/// Turns a transport error into the human-readable message the Router's
/// retry classifier matches against (spec's fixed keyword set expects
/// substrings like "timeout", "connection refused", "connection reset").
fn describe_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return format!("request timed out: {err}");
    }
    if err.is_connect() {
        return format!("connect exception: {err}");
    }
    format!("request failed: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Endpoint, HealthStatus, NodeId, Scheme};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn node_for(server: &MockServer) -> Node {
        let url = server.uri();
        let without_scheme = url.trim_start_matches("http://");
        let (host, port) = without_scheme.rsplit_once(':').unwrap();
        Node {
            id: NodeId::new("n1").unwrap(),
            endpoint: Endpoint::new(Scheme::Http, host, port.parse().unwrap()).unwrap(),
            status: HealthStatus::Healthy,
        }
    }

    #[tokio::test]
    async fn success_response_is_not_an_error_regardless_of_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(500).set_body_string("{\"x\":1}"))
            .mount(&server)
            .await;

        let client = BackendClient::new();
        let result = client
            .forward(
                &node_for(&server),
                "/test",
                Method::POST,
                reqwest::header::HeaderMap::new(),
                Some(b"{}".to_vec()),
                Duration::from_secs(1),
            )
            .await;

        match result {
            ForwardResult::Success { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, b"{\"x\":1}");
            }
            ForwardResult::Failure { error } => panic!("expected success, got failure: {error}"),
        }
    }

    #[tokio::test]
    async fn transport_timeout_is_reported_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;

        let client = BackendClient::new();
        let result = client
            .forward(
                &node_for(&server),
                "/slow",
                Method::POST,
                reqwest::header::HeaderMap::new(),
                None,
                Duration::from_millis(50),
            )
            .await;

        match result {
            ForwardResult::Failure { error } => {
                assert!(error.to_lowercase().contains("timeout") || error.to_lowercase().contains("timed out"));
            }
            ForwardResult::Success { .. } => panic!("expected a transport failure"),
        }
    }

    #[tokio::test]
    async fn caller_content_type_is_not_duplicated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            "text/plain".parse().unwrap(),
        );

        let client = BackendClient::new();
        client
            .forward(
                &node_for(&server),
                "/test",
                Method::POST,
                headers,
                Some(b"{}".to_vec()),
                Duration::from_secs(1),
            )
            .await;

        let requests = server.received_requests().await.unwrap();
        let received = &requests[0];
        let content_types: Vec<_> = received
            .headers
            .get_all(reqwest::header::CONTENT_TYPE)
            .iter()
            .collect();
        assert_eq!(content_types.len(), 1, "expected exactly one Content-Type header");
        assert_eq!(content_types[0], "application/json");
    }
}
