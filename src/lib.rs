//! Campus API gateway library.
//!
//! HTTP front door for the learning platform: catalog reads and student
//! accounts, delegated to a managed data/auth backend.

pub mod accounts;
pub mod api;
pub mod catalog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use upstream::{SupabaseClient, Upstream};
