//! Registration and session flows.
//!
//! Registration is a sequence of independent backend calls:
//!
//! ```text
//! validate body ─▶ institution by code ─▶ email unused? ─▶ sign up ─▶ profile row
//!      400              400 if none          400 if taken    400/500     best effort
//! ```
//!
//! None of the steps is atomic with the next. Two registrations racing on
//! the same email can both pass the email check; the auth service's own
//! uniqueness constraint then rejects the second signup. A failed profile
//! write leaves the auth account in place and is reported as
//! `perfil_creado: false`; reads fall back to the account metadata.

use serde_json::{json, Map, Value};

use crate::accounts::models::{
    InstitucionResumen, LoginOutcome, LoginRequest, NuevoEstudiante, RegisteredUser,
    RegistrationOutcome, RegistroEstudiante, SessionSummary, UserSummary, ROL_ESTUDIANTE,
};
use crate::accounts::profile::{self, USUARIOS};
use crate::catalog::service::find_institucion_by_codigo;
use crate::http::error::ApiError;
use crate::upstream::{SignUpRequest, Upstream, UpstreamError};

const REGISTRO_CAMPOS: [&str; 6] = [
    "nombre",
    "apellido",
    "email",
    "password",
    "codigo_institucion",
    "grado",
];

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn missing_fields_error(missing: &[&str]) -> ApiError {
    ApiError::Validation(format!("Faltan campos requeridos: {}", missing.join(", ")))
}

/// Loose shape check; the auth service does the real validation.
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Check required fields before anything reaches the backend.
pub fn validate_registration(body: &RegistroEstudiante) -> Result<NuevoEstudiante, ApiError> {
    let values = [
        present(&body.nombre),
        present(&body.apellido),
        present(&body.email),
        // Passwords are taken verbatim; only emptiness is checked.
        body.password.clone().filter(|p| !p.is_empty()),
        present(&body.codigo_institucion),
        present(&body.grado),
    ];
    let missing: Vec<&str> = REGISTRO_CAMPOS
        .iter()
        .zip(values.iter())
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(missing_fields_error(&missing));
    }

    let [Some(nombre), Some(apellido), Some(email), Some(password), Some(codigo_institucion), Some(grado)] =
        values
    else {
        return Err(ApiError::Internal("registration fields vanished".into()));
    };

    let email = email.to_lowercase();
    if !is_plausible_email(&email) {
        return Err(ApiError::Validation("El email no tiene un formato válido".to_string()));
    }

    Ok(NuevoEstudiante {
        nombre,
        apellido,
        email,
        password,
        codigo_institucion,
        grado,
    })
}

/// Register a student account against an institution access code.
pub async fn register_student(
    upstream: &dyn Upstream,
    body: &RegistroEstudiante,
) -> Result<RegistrationOutcome, ApiError> {
    let nuevo = validate_registration(body)?;

    let institucion = find_institucion_by_codigo(upstream, &nuevo.codigo_institucion)
        .await
        .map_err(|e| ApiError::unavailable("Error al verificar la institución", e))?
        .ok_or_else(|| {
            ApiError::Validation("Código de institución inválido o inactivo".to_string())
        })?;

    if profile::email_registered(upstream, &nuevo.email)
        .await
        .map_err(|e| ApiError::unavailable("Error al verificar el email", e))?
    {
        return Err(ApiError::Validation("El email ya está registrado".to_string()));
    }

    let mut metadata = Map::new();
    metadata.insert("nombre".into(), Value::String(nuevo.nombre.clone()));
    metadata.insert("apellido".into(), Value::String(nuevo.apellido.clone()));
    metadata.insert("rol".into(), Value::String(ROL_ESTUDIANTE.to_string()));
    metadata.insert("grado".into(), Value::String(nuevo.grado.clone()));
    metadata.insert("institucion_id".into(), json!(institucion.id));
    metadata.insert("institucion_nombre".into(), Value::String(institucion.nombre.clone()));

    let request = SignUpRequest {
        email: nuevo.email.clone(),
        password: nuevo.password.clone(),
        data: metadata,
    };
    let user = upstream
        .sign_up(&request)
        .await
        .map_err(|e| ApiError::upstream("Error al crear la cuenta", e))?;

    tracing::info!(
        user_id = %user.id,
        institucion_id = institucion.id,
        "Student account created"
    );

    let row = json!({
        "id": user.id,
        "nombre": nuevo.nombre,
        "apellido": nuevo.apellido,
        "email": nuevo.email,
        "rol": ROL_ESTUDIANTE,
        "grado": nuevo.grado,
        "institucion_id": institucion.id,
        "activo": true,
    });
    let perfil_creado = match upstream.insert(USUARIOS, row).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "Profile row not written; account kept");
            false
        }
    };

    Ok(RegistrationOutcome {
        user: RegisteredUser {
            id: user.id,
            email: user.email.unwrap_or(nuevo.email),
            nombre: nuevo.nombre,
            apellido: nuevo.apellido,
            rol: ROL_ESTUDIANTE.to_string(),
            grado: nuevo.grado,
            institucion: InstitucionResumen {
                id: institucion.id,
                nombre: institucion.nombre,
            },
        },
        perfil_creado,
    })
}

/// Password login, enriched with profile data.
pub async fn login(upstream: &dyn Upstream, body: &LoginRequest) -> Result<LoginOutcome, ApiError> {
    let email = present(&body.email);
    let password = body.password.clone().filter(|p| !p.is_empty());
    let (email, password) = match (email, password) {
        (Some(email), Some(password)) => (email.to_lowercase(), password),
        (email, password) => {
            let mut missing = Vec::new();
            if email.is_none() {
                missing.push("email");
            }
            if password.is_none() {
                missing.push("password");
            }
            return Err(missing_fields_error(&missing));
        }
    };

    let session = match upstream.sign_in_with_password(&email, &password).await {
        Ok(session) => session,
        Err(UpstreamError::Rejected { message, .. }) => {
            tracing::info!(reason = %message, "Login rejected");
            return Err(ApiError::Unauthorized("Credenciales inválidas".to_string()));
        }
        Err(e) => return Err(ApiError::unavailable("Error al iniciar sesión", e)),
    };
    if session.access_token.is_empty() {
        return Err(ApiError::Internal("auth service returned an empty token".into()));
    }

    let perfil = profile::load_profile_or_none(upstream, &session.user.id).await;
    let user = profile::merge_user(&session.user, perfil.as_ref());

    Ok(LoginOutcome {
        session: SessionSummary::from(&session),
        user,
    })
}

/// User behind an access token.
pub async fn current_user(upstream: &dyn Upstream, access_token: &str) -> Result<UserSummary, ApiError> {
    let user = match upstream.get_user(access_token).await {
        Ok(user) => user,
        Err(UpstreamError::Rejected { .. }) => {
            return Err(ApiError::Unauthorized("Token inválido o expirado".to_string()))
        }
        Err(e) => return Err(ApiError::unavailable("Error al obtener el usuario", e)),
    };
    let perfil = profile::load_profile_or_none(upstream, &user.id).await;
    Ok(profile::merge_user(&user, perfil.as_ref()))
}

/// Revoke a session. Tokens the backend no longer recognises count as
/// already logged out.
pub async fn logout(upstream: &dyn Upstream, access_token: Option<&str>) -> Result<(), ApiError> {
    let Some(token) = access_token else {
        return Ok(());
    };
    match upstream.sign_out(token).await {
        Ok(()) => Ok(()),
        Err(UpstreamError::Rejected { status, .. }) => {
            tracing::debug!(status, "Logout token already invalid");
            Ok(())
        }
        Err(e) => Err(ApiError::unavailable("Error al cerrar sesión", e)),
    }
}
