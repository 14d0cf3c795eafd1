use routehound::config::Config;
use routehound::error::GatewayError;
use routehound::http::{self, AppState};
use routehound::prober::HealthProber;
use routehound::registry::NodeRegistry;
use routehound::router::Router;
use routehound::strategy::RoundRobin;
use routehound::{client::BackendClient, types::Node};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    routehound::telemetry::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting routehound");

    let registry = Arc::new(NodeRegistry::new());
    match config.bootstrap_endpoints() {
        Ok(endpoints) => {
            for (id, endpoint) in endpoints {
                tracing::info!("  - {}: {}", id, endpoint);
                match routehound::types::NodeId::new(id) {
                    Ok(node_id) => registry.save(Node::new(node_id, endpoint)),
                    Err(e) => tracing::error!("skipping invalid node: {e}"),
                }
            }
        }
        Err(e) => {
            tracing::error!("invalid backend node configuration: {e}");
            std::process::exit(1);
        }
    }
    tracing::info!("Configured {} upstream nodes", registry.find_all().len());

    if config.health_check_enabled {
        let prober = Arc::new(HealthProber::new(
            config.health_check_path.clone(),
            config.health_check_timeout,
        ));
        prober.start(Arc::clone(&registry), config.health_check_interval);
    }

    let router = Arc::new(Router::new(
        Arc::clone(&registry),
        Arc::new(RoundRobin::new()),
        BackendClient::new(),
        config.request_timeout,
        config.max_attempts,
    ));

    // Root of the per-request cancellation tree: each inbound request holds
    // a child of this token, cancelled in one shot on shutdown so in-flight
    // forwards don't run out their full timeout for nothing.
    let shutdown = CancellationToken::new();

    let state = AppState {
        router,
        registry: Arc::clone(&registry),
        shutdown: shutdown.clone(),
    };

    let app = http::build(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(source) => {
            let err = GatewayError::Bind {
                addr: addr.clone(),
                source,
            };
            tracing::error!("{err}");
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on http://{addr}");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await;

    if let Err(source) = result {
        let err = GatewayError::Server(source);
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

/// Waits for Ctrl+C or SIGTERM, then cancels `shutdown` so every in-flight
/// request's child token fires and `axum::serve` stops accepting new
/// connections.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
    shutdown.cancel();
}
