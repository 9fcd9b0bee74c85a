//! Security response headers.
//!
//! # Headers
//! - `Content-Security-Policy` (configurable)
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options: SAMEORIGIN`
//! - `Referrer-Policy: no-referrer`

use axum::{
    http::{header, HeaderValue},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::SecurityConfig;

/// Add the hardening headers to every response of `router`.
pub fn apply_security_headers<S>(router: Router<S>, config: &SecurityConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if !config.enable_headers {
        tracing::warn!("Security response headers disabled");
        return router;
    }

    let router = router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ));

    match HeaderValue::from_str(&config.content_security_policy) {
        Ok(csp) => router.layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            csp,
        )),
        Err(e) => {
            tracing::warn!(error = %e, "Content-Security-Policy is not a valid header value");
            router
        }
    }
}
