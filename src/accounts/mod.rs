//! Student accounts: registration, login and session lookup.
//!
//! Identity lives in the backend's auth service; the `usuarios` table holds
//! the profile fields shown to clients.

pub mod models;
pub mod profile;
pub mod service;

pub use models::{LoginRequest, RegistroEstudiante, UserSummary};
