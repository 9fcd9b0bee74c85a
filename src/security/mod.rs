//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin allow-list, preflight)
//!     → limits.rs (body size cap, enforced by the JSON extractor)
//!     → handler
//! Outgoing response:
//!     → headers.rs (CSP, nosniff, framing, referrer)
//! ```
//!
//! # Design Decisions
//! - Origins are an explicit list; no wildcard when credentials are allowed
//! - Headers set by a handler are never overwritten

pub mod cors;
pub mod headers;
pub mod limits;

pub use cors::cors_layer;
pub use headers::apply_security_headers;
pub use limits::body_limit;
