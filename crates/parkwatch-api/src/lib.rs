// parkwatch-api: Async Rust client for the parking monitoring REST backend

pub mod alerts;
pub mod analytics;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod facilities;
pub mod live;
pub mod models;
pub mod query;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use query::ListQuery;
pub use transport::TransportConfig;
