//! Liveness, connectivity and fallback handlers.

use axum::{
    extract::State,
    http::Uri,
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::catalog::service;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub environment: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub success: bool,
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// `GET /`. Static payload, never touches the backend.
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "campus-gateway",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        environment: state.environment.as_str(),
    })
}

/// `GET /api/health`. One trivial read against the backend.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    service::ping(state.upstream.as_ref())
        .await
        .map_err(|e| ApiError::unavailable("Error de conexión con la base de datos", e))?;

    Ok(Json(HealthStatus {
        success: true,
        status: "ok",
        database: "connected",
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), "No route matched");
    ApiError::NotFound(uri.path().to_string())
}
