//! Catalog reads.
//!
//! Every listing asks the backend for active rows in display order and then
//! re-applies the same rule locally, so the response never depends on how
//! faithfully the backend honoured the query.

use std::collections::HashMap;

use crate::catalog::models::{active_in_order, Curso, Institucion, Leccion, Nivel, NivelResumen};
use crate::upstream::{select_rows, Query, Upstream, UpstreamResult};

pub const NIVELES: &str = "niveles";
pub const CURSOS: &str = "cursos";
pub const LECCIONES: &str = "lecciones";
pub const INSTITUCIONES: &str = "instituciones";

/// Which courses to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursoFilter {
    All,
    NivelId(i64),
    /// Level looked up by its exact name.
    NivelNombre(String),
}

/// Cheap read proving the backend answers.
pub async fn ping(upstream: &dyn Upstream) -> UpstreamResult<()> {
    upstream
        .select(&Query::from(NIVELES).select("id").limit(1))
        .await?;
    Ok(())
}

pub async fn list_niveles(upstream: &dyn Upstream) -> UpstreamResult<Vec<Nivel>> {
    let query = Query::from(NIVELES)
        .eq("activo", true)
        .order_asc("orden_nivel");
    Ok(active_in_order(select_rows(upstream, &query).await?))
}

/// Active courses, each carrying its level's name and description.
pub async fn list_cursos(upstream: &dyn Upstream, filter: CursoFilter) -> UpstreamResult<Vec<Curso>> {
    let mut query = Query::from(CURSOS).eq("activo", true);
    let niveles_query = match &filter {
        CursoFilter::All => Query::from(NIVELES),
        CursoFilter::NivelId(id) => {
            query = query.eq("nivel_id", *id);
            Query::from(NIVELES).eq("id", *id)
        }
        CursoFilter::NivelNombre(nombre) => {
            let niveles: Vec<Nivel> = select_rows(
                upstream,
                &Query::from(NIVELES).eq("nombre", nombre.as_str()).eq("activo", true),
            )
            .await?;
            let Some(nivel) = active_in_order(niveles).into_iter().next() else {
                tracing::debug!(nivel = %nombre, "No active level with that name");
                return Ok(Vec::new());
            };
            query = query.eq("nivel_id", nivel.id);
            Query::from(NIVELES).eq("id", nivel.id)
        }
    };
    let query = query.order_asc("orden_curso");

    let cursos: Vec<Curso> = select_rows(upstream, &query).await?;
    let mut cursos = active_in_order(cursos);
    if let CursoFilter::NivelId(id) = filter {
        cursos.retain(|c| c.nivel_id == id);
    }
    if cursos.is_empty() {
        return Ok(cursos);
    }

    let niveles: Vec<Nivel> = select_rows(upstream, &niveles_query).await?;
    let by_id: HashMap<i64, NivelResumen> =
        niveles.iter().map(|n| (n.id, NivelResumen::from(n))).collect();
    for curso in &mut cursos {
        curso.nivel = by_id.get(&curso.nivel_id).cloned();
    }
    Ok(cursos)
}

pub async fn list_lecciones(upstream: &dyn Upstream, curso_id: i64) -> UpstreamResult<Vec<Leccion>> {
    let query = Query::from(LECCIONES)
        .eq("curso_id", curso_id)
        .eq("activo", true)
        .order_asc("orden_leccion");
    let mut lecciones = active_in_order(select_rows::<Leccion>(upstream, &query).await?);
    lecciones.retain(|l| l.curso_id == curso_id);
    Ok(lecciones)
}

/// Active institutions, alphabetically.
pub async fn list_instituciones(upstream: &dyn Upstream) -> UpstreamResult<Vec<Institucion>> {
    let query = Query::from(INSTITUCIONES)
        .select("id,nombre,codigo_acceso,activo")
        .eq("activo", true)
        .order_asc("nombre");
    let mut instituciones: Vec<Institucion> = select_rows(upstream, &query).await?;
    instituciones.retain(|i| i.activo);
    instituciones.sort_by(|a, b| a.nombre.cmp(&b.nombre).then(a.id.cmp(&b.id)));
    Ok(instituciones)
}

/// The active institution owning `codigo`, if any.
pub async fn find_institucion_by_codigo(
    upstream: &dyn Upstream,
    codigo: &str,
) -> UpstreamResult<Option<Institucion>> {
    let query = Query::from(INSTITUCIONES)
        .select("id,nombre,codigo_acceso,activo")
        .eq("codigo_acceso", codigo)
        .eq("activo", true)
        .limit(1);
    let found: Vec<Institucion> = select_rows(upstream, &query).await?;
    Ok(found
        .into_iter()
        .find(|i| i.activo && i.codigo_acceso == codigo))
}
