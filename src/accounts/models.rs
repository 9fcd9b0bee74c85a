//! Account payloads: what clients send, what the profile store holds and
//! what the gateway answers with.

use serde::{Deserialize, Deserializer, Serialize};

use crate::upstream::AuthSession;

/// Role assigned to every self-registered account.
pub const ROL_ESTUDIANTE: &str = "estudiante";

/// Accept strings, numbers or booleans for free-form text fields.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Bool(b) => b.to_string(),
    }))
}

/// `POST /api/auth/registro-estudiante` body. Every field is optional at the
/// type level so that missing ones are reported together.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistroEstudiante {
    #[serde(default, deserialize_with = "lenient_string")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub apellido: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub codigo_institucion: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub grado: Option<String>,
}

/// Registration input after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuevoEstudiante {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub password: String,
    pub codigo_institucion: String,
    pub grado: String,
}

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
}

/// Row of the `usuarios` profile table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Perfil {
    pub id: String,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellido: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub grado: Option<String>,
    #[serde(default)]
    pub institucion_id: Option<i64>,
    #[serde(default)]
    pub activo: Option<bool>,
}

/// User as presented to clients after merging profile and auth data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub rol: String,
    pub grado: Option<String>,
    pub institucion_id: Option<i64>,
    pub institucion_nombre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitucionResumen {
    pub id: i64,
    pub nombre: String,
}

/// Account created by a registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    pub rol: String,
    pub grado: String,
    pub institucion: InstitucionResumen,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationOutcome {
    pub user: RegisteredUser,
    /// Whether the profile row was written; see the registration flow.
    pub perfil_creado: bool,
}

/// Token data handed back on login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub expires_at: Option<u64>,
    pub token_type: String,
}

impl From<&AuthSession> for SessionSummary {
    fn from(session: &AuthSession) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_in: session.expires_in,
            expires_at: session.expires_at,
            token_type: session
                .token_type
                .clone()
                .unwrap_or_else(|| "bearer".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub session: SessionSummary,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grado_accepts_numbers() {
        let body: RegistroEstudiante =
            serde_json::from_value(json!({"grado": 5, "nombre": "Ana"})).unwrap();
        assert_eq!(body.grado.as_deref(), Some("5"));
        assert_eq!(body.nombre.as_deref(), Some("Ana"));
        assert!(body.email.is_none());
    }

    #[test]
    fn test_null_fields_are_absent() {
        let body: LoginRequest =
            serde_json::from_value(json!({"email": null, "password": "x"})).unwrap();
        assert!(body.email.is_none());
        assert_eq!(body.password.as_deref(), Some("x"));
    }

    #[test]
    fn test_profile_grado_from_number() {
        let perfil: Perfil =
            serde_json::from_value(json!({"id": "u1", "grado": 3, "institucion_id": 2})).unwrap();
        assert_eq!(perfil.grado.as_deref(), Some("3"));
        assert_eq!(perfil.institucion_id, Some(2));
        assert!(perfil.nombre.is_none());
    }
}
