// netwatch-api: Async Rust client for the NetDashboard telemetry REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod metrics;
mod notifications;
mod services;

pub use client::DashClient;
pub use error::Error;
