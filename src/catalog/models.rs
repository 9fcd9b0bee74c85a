//! Catalog rows as stored by the managed backend.

use serde::{Deserialize, Serialize};

/// Rows that carry an active flag and a display position.
pub trait Ordered {
    fn is_active(&self) -> bool;

    /// Display position, then id, so ties still sort deterministically.
    fn sort_key(&self) -> (i32, i64);
}

/// Keep active rows and sort them by display position.
pub fn active_in_order<T: Ordered>(mut rows: Vec<T>) -> Vec<T> {
    rows.retain(Ordered::is_active);
    rows.sort_by_key(Ordered::sort_key);
    rows
}

/// Educational stage (Primaria, Secundaria, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nivel {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub orden_nivel: i32,
    pub activo: bool,
}

impl Ordered for Nivel {
    fn is_active(&self) -> bool {
        self.activo
    }

    fn sort_key(&self) -> (i32, i64) {
        (self.orden_nivel, self.id)
    }
}

/// Level fields embedded in each course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NivelResumen {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

impl From<&Nivel> for NivelResumen {
    fn from(nivel: &Nivel) -> Self {
        Self {
            nombre: nivel.nombre.clone(),
            descripcion: nivel.descripcion.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curso {
    pub id: i64,
    pub nivel_id: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub orden_curso: i32,
    pub activo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel: Option<NivelResumen>,
}

impl Ordered for Curso {
    fn is_active(&self) -> bool {
        self.activo
    }

    fn sort_key(&self) -> (i32, i64) {
        (self.orden_curso, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leccion {
    pub id: i64,
    pub curso_id: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub orden_leccion: i32,
    pub activo: bool,
}

impl Ordered for Leccion {
    fn is_active(&self) -> bool {
        self.activo
    }

    fn sort_key(&self) -> (i32, i64) {
        (self.orden_leccion, self.id)
    }
}

/// Institution with its shared access code. The active flag is read but
/// never sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institucion {
    pub id: i64,
    pub nombre: String,
    pub codigo_acceso: String,
    #[serde(skip_serializing)]
    pub activo: bool,
}
