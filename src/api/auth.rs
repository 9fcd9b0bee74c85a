//! Account handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::accounts::models::{
    LoginRequest, RegisteredUser, RegistroEstudiante, SessionSummary, UserSummary,
};
use crate::accounts::service;
use crate::http::error::ApiError;
use crate::http::request::{BearerToken, JsonBody};
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct RegistroResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: RegisteredUser,
    pub perfil_creado: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub session: SessionSummary,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: &'static str,
}

/// `POST /api/auth/registro-estudiante`
pub async fn registro_estudiante(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegistroEstudiante>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = service::register_student(state.upstream.as_ref(), &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegistroResponse {
            success: true,
            message: "Estudiante registrado exitosamente",
            user: outcome.user,
            perfil_creado: outcome.perfil_creado,
        }),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = service::login(state.upstream.as_ref(), &body).await?;
    Ok(Json(LoginResponse {
        success: true,
        message: "Inicio de sesión exitoso",
        session: outcome.session,
        user: outcome.user,
    }))
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<MeResponse>, ApiError> {
    let user = service::current_user(state.upstream.as_ref(), token.as_str()).await?;
    Ok(Json(MeResponse { success: true, user }))
}

/// `POST /api/auth/logout`; succeeds with or without a token.
pub async fn logout(
    State(state): State<AppState>,
    token: Option<BearerToken>,
) -> Result<Json<LogoutResponse>, ApiError> {
    service::logout(state.upstream.as_ref(), token.as_ref().map(BearerToken::as_str)).await?;
    Ok(Json(LogoutResponse {
        success: true,
        message: "Sesión cerrada exitosamente",
    }))
}
