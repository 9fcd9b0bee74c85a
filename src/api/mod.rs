//! Public REST surface.
//!
//! # Routes
//! ```text
//! GET  /                               liveness payload
//! GET  /api/health                     backend connectivity
//! GET  /api/niveles                    active levels
//! GET  /api/cursos[?nivel=<nombre>]    active courses
//! GET  /api/cursos/{nivel_id}          active courses of a level
//! GET  /api/lecciones/{curso_id}       active lessons of a course
//! GET  /api/instituciones              active institutions
//! POST /api/auth/registro-estudiante   student signup
//! POST /api/auth/login                 password login
//! GET  /api/auth/me                    user behind a bearer token
//! POST /api/auth/logout                revoke a bearer token
//! *    anything else                   404 with the path (also for a
//!                                      known path with the wrong method)
//! ```

pub mod auth;
pub mod catalog;
pub mod system;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::server::AppState;

pub fn setup_api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(system::root))
        .route("/api/health", get(system::health))
        .route("/api/niveles", get(catalog::get_niveles))
        .route("/api/cursos", get(catalog::get_cursos))
        .route("/api/cursos/{nivel_id}", get(catalog::get_cursos_por_nivel))
        .route("/api/lecciones/{curso_id}", get(catalog::get_lecciones))
        .route("/api/instituciones", get(catalog::get_instituciones))
        .route("/api/auth/registro-estudiante", post(auth::registro_estudiante))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .method_not_allowed_fallback(system::not_found)
        .fallback(system::not_found)
}
