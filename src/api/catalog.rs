//! Catalog listings.
//!
//! Any backend failure on these routes is a 500; the listings take no user
//! input that the backend could legitimately reject.

use axum::extract::State;
use serde::Deserialize;

use crate::catalog::models::{Curso, Institucion, Leccion, Nivel};
use crate::catalog::service::{self, CursoFilter};
use crate::http::error::ApiError;
use crate::http::request::{PathParam, QueryParams};
use crate::http::response::Listing;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CursosParams {
    /// Level name, e.g. `?nivel=Primaria`.
    pub nivel: Option<String>,
}

fn parse_id(raw: &str, name: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::Validation(format!("{} inválido: {}", name, raw)))
}

/// `GET /api/niveles`
pub async fn get_niveles(State(state): State<AppState>) -> Result<Listing<Nivel>, ApiError> {
    let niveles = service::list_niveles(state.upstream.as_ref())
        .await
        .map_err(|e| ApiError::unavailable("Error al obtener niveles", e))?;
    Ok(Listing::new("niveles", niveles))
}

/// `GET /api/cursos[?nivel=<nombre>]`
pub async fn get_cursos(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<CursosParams>,
) -> Result<Listing<Curso>, ApiError> {
    let filter = match params.nivel.as_deref().map(str::trim) {
        Some(nombre) if !nombre.is_empty() => CursoFilter::NivelNombre(nombre.to_string()),
        _ => CursoFilter::All,
    };
    let cursos = service::list_cursos(state.upstream.as_ref(), filter)
        .await
        .map_err(|e| ApiError::unavailable("Error al obtener cursos", e))?;
    Ok(Listing::new("cursos", cursos))
}

/// `GET /api/cursos/{nivel_id}`
pub async fn get_cursos_por_nivel(
    State(state): State<AppState>,
    PathParam(nivel_id): PathParam<String>,
) -> Result<Listing<Curso>, ApiError> {
    let nivel_id = parse_id(&nivel_id, "nivelId")?;
    let cursos = service::list_cursos(state.upstream.as_ref(), CursoFilter::NivelId(nivel_id))
        .await
        .map_err(|e| ApiError::unavailable("Error al obtener cursos", e))?;
    Ok(Listing::new("cursos", cursos))
}

/// `GET /api/lecciones/{curso_id}`
pub async fn get_lecciones(
    State(state): State<AppState>,
    PathParam(curso_id): PathParam<String>,
) -> Result<Listing<Leccion>, ApiError> {
    let curso_id = parse_id(&curso_id, "cursoId")?;
    let lecciones = service::list_lecciones(state.upstream.as_ref(), curso_id)
        .await
        .map_err(|e| ApiError::unavailable("Error al obtener lecciones", e))?;
    Ok(Listing::new("lecciones", lecciones))
}

/// `GET /api/instituciones`
pub async fn get_instituciones(
    State(state): State<AppState>,
) -> Result<Listing<Institucion>, ApiError> {
    let instituciones = service::list_instituciones(state.upstream.as_ref())
        .await
        .map_err(|e| ApiError::unavailable("Error al obtener instituciones", e))?;
    Ok(Listing::new("instituciones", instituciones))
}
