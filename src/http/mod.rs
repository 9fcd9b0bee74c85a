//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, bearer token, JSON body)
//!     → api handlers
//!     → response.rs / error.rs (envelopes)
//!     → Send to client
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::{BearerToken, JsonBody, PathParam, QueryParams, X_REQUEST_ID};
pub use response::Listing;
pub use server::{AppState, GatewayServer};
