//! Client for the campus API gateway.

pub mod client;

pub use client::{CampusClient, ClientError, LoginBody, RegistroBody};
