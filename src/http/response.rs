//! Response envelopes.
//!
//! Successful listings share one shape:
//! `{"success": true, "count": <n>, "<key>": [...]}` where `<key>` names the
//! collection (`niveles`, `cursos`, ...).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A counted collection under a named key.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    key: &'static str,
    items: Vec<T>,
}

impl<T> Listing<T> {
    pub fn new(key: &'static str, items: Vec<T>) -> Self {
        Self { key, items }
    }
}

impl<T: Serialize> Serialize for Listing<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry("count", &self.items.len())?;
        map.serialize_entry(self.key, &self.items)?;
        map.end()
    }
}

impl<T: Serialize> IntoResponse for Listing<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
