//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → .env + process environment overrides
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Missing upstream URL or key is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_runtime_config, ConfigError};
pub use schema::{
    CorsConfig, Environment, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    SecurityConfig, UpstreamConfig,
};
