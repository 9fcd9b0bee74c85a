//! Course catalog: levels, courses, lessons and institutions.

pub mod models;
pub mod service;

pub use models::{Curso, Institucion, Leccion, Nivel, NivelResumen};
pub use service::CursoFilter;
