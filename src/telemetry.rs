//! Tracing subscriber initialization, following the teacher's `main.rs`
//! setup: an env-filter layer defaulting to info-level for this crate and
//! for `tower_http`, plus the standard fmt layer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routehound=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
