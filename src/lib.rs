pub mod admin;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod prober;
pub mod registry;
pub mod router;
pub mod strategy;
pub mod telemetry;
pub mod types;
