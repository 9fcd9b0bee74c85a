//! Managed backend integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (project URL, access key)
//!     → client.rs (HTTP client, one per process)
//!     → query.rs (table reads rendered to the data API dialect)
//!     → types.rs (auth payloads, error mapping)
//! ```
//!
//! # Constraints
//! - The access key is never logged
//! - One shared client, built before the listener accepts traffic
//! - No retries; a failed call fails the request

pub mod client;
pub mod query;
pub mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use client::SupabaseClient;
pub use query::Query;
pub use types::{AuthSession, AuthUser, SignUpRequest, UpstreamError, UpstreamResult};

/// The data and identity operations the gateway delegates.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Read rows matching `query`.
    async fn select(&self, query: &Query) -> UpstreamResult<Vec<Value>>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> UpstreamResult<Value>;

    /// Create an account; metadata travels in `request.data`.
    async fn sign_up(&self, request: &SignUpRequest) -> UpstreamResult<AuthUser>;

    /// Password grant.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> UpstreamResult<AuthSession>;

    /// Resolve an access token to its user.
    async fn get_user(&self, access_token: &str) -> UpstreamResult<AuthUser>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> UpstreamResult<()>;
}

/// Run `query` and decode each row into `T`.
pub async fn select_rows<T: DeserializeOwned>(
    upstream: &dyn Upstream,
    query: &Query,
) -> UpstreamResult<Vec<T>> {
    upstream
        .select(query)
        .await?
        .into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| {
                UpstreamError::Decode(format!("{} row: {}", query.table(), e))
            })
        })
        .collect()
}
