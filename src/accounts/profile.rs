//! Profile lookup and the profile/metadata merge.
//!
//! A user's fields come from up to three places. Precedence, per field:
//!
//! 1. the `usuarios` profile row
//! 2. the auth user's metadata (written at registration)
//! 3. the auth user's own fields (email only)
//!
//! Blank strings count as missing at every level. `rol` falls back to
//! `estudiante`.

use serde_json::{Map, Value};

use crate::accounts::models::{Perfil, UserSummary, ROL_ESTUDIANTE};
use crate::upstream::{select_rows, AuthUser, Query, Upstream, UpstreamResult};

pub const USUARIOS: &str = "usuarios";

/// Profile row for an auth user id.
pub async fn load_profile(upstream: &dyn Upstream, user_id: &str) -> UpstreamResult<Option<Perfil>> {
    let query = Query::from(USUARIOS).eq("id", user_id).limit(1);
    let rows: Vec<Perfil> = select_rows(upstream, &query).await?;
    Ok(rows.into_iter().next())
}

/// Profile lookup that degrades to "no profile" when the store fails.
pub async fn load_profile_or_none(upstream: &dyn Upstream, user_id: &str) -> Option<Perfil> {
    match load_profile(upstream, user_id).await {
        Ok(perfil) => perfil,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Profile lookup failed, using auth metadata");
            None
        }
    }
}

/// Whether a profile already uses `email`.
pub async fn email_registered(upstream: &dyn Upstream, email: &str) -> UpstreamResult<bool> {
    let query = Query::from(USUARIOS).select("id").eq("email", email).limit(1);
    Ok(!upstream.select(&query).await?.is_empty())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn meta_text(metadata: &Map<String, Value>, key: &str) -> Option<String> {
    match metadata.get(key)? {
        Value::String(s) => non_blank(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn meta_i64(metadata: &Map<String, Value>, key: &str) -> Option<i64> {
    match metadata.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn profile_text<F>(perfil: Option<&Perfil>, field: F) -> Option<String>
where
    F: Fn(&Perfil) -> Option<&str>,
{
    non_blank(perfil.and_then(field))
}

/// Combine an auth user with its (optional) profile row.
pub fn merge_user(user: &AuthUser, perfil: Option<&Perfil>) -> UserSummary {
    let meta = &user.user_metadata;

    let institucion_id = perfil
        .and_then(|p| p.institucion_id)
        .or_else(|| meta_i64(meta, "institucion_id"));
    // The name only lives in metadata; drop it if the profile moved the user.
    let institucion_nombre = match meta_i64(meta, "institucion_id") {
        Some(id) if Some(id) != institucion_id => None,
        _ => meta_text(meta, "institucion_nombre"),
    };

    UserSummary {
        id: user.id.clone(),
        email: profile_text(perfil, |p| p.email.as_deref())
            .or_else(|| non_blank(user.email.as_deref()))
            .or_else(|| meta_text(meta, "email")),
        nombre: profile_text(perfil, |p| p.nombre.as_deref()).or_else(|| meta_text(meta, "nombre")),
        apellido: profile_text(perfil, |p| p.apellido.as_deref()).or_else(|| meta_text(meta, "apellido")),
        rol: profile_text(perfil, |p| p.rol.as_deref())
            .or_else(|| meta_text(meta, "rol"))
            .unwrap_or_else(|| ROL_ESTUDIANTE.to_string()),
        grado: profile_text(perfil, |p| p.grado.as_deref()).or_else(|| meta_text(meta, "grado")),
        institucion_id,
        institucion_nombre,
    }
}
