//! Error detail exposure.
//!
//! Error responses carry their underlying cause as an [`ErrorDetail`]
//! extension. Outside production this layer copies it into the JSON body as
//! `"details"`; in production the layer is not installed and the cause never
//! leaves the process.

use axum::{
    body::{to_bytes, Body},
    http::header,
    response::Response,
};
use serde_json::Value;

use crate::http::error::ErrorDetail;

// Error bodies are small; anything bigger is passed through untouched.
const MAX_ERROR_BODY: usize = 64 * 1024;

/// `map_response` middleware adding `details` to error bodies.
pub async fn attach_error_details(response: Response) -> Response {
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Could not buffer error body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) => {
            map.insert("details".to_string(), Value::String(detail));
            match serde_json::to_vec(&Value::Object(map)) {
                Ok(rendered) => {
                    parts.headers.remove(header::CONTENT_LENGTH);
                    Body::from(rendered)
                }
                Err(_) => Body::from(bytes),
            }
        }
        _ => Body::from(bytes),
    };
    Response::from_parts(parts, body)
}
