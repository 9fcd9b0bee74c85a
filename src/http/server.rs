//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, headers, limits, metrics)
//! - Bind the server to a listener and drain on shutdown
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → PropagateRequestId → Trace → CORS → security headers
//!     → metrics → body limit → error details (non-production) → catch panic
//!     → handler
//! ```

use std::sync::Arc;

use axum::{body::Body, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::api::setup_api_router;
use crate::config::{Environment, GatewayConfig};
use crate::http::error::panic_response;
use crate::http::middleware::attach_error_details;
use crate::http::request::{request_span, GatewayRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::security::{apply_security_headers, body_limit, cors_layer};
use crate::upstream::{SupabaseClient, Upstream, UpstreamResult};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub environment: Environment,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server delegating to `upstream`.
    pub fn new(config: GatewayConfig, upstream: Arc<dyn Upstream>) -> Self {
        let state = AppState {
            upstream,
            environment: config.environment,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Create a server backed by the configured managed backend.
    pub fn from_config(config: GatewayConfig) -> UpstreamResult<Self> {
        let client = SupabaseClient::new(&config.upstream)?;
        tracing::info!(upstream = %client.base_url(), "Upstream client ready");
        Ok(Self::new(config, Arc::new(client)))
    }

    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let environment = config.environment;

        let mut router = setup_api_router()
            .with_state(state)
            .layer(CatchPanicLayer::custom(panic_response));

        if environment.exposes_error_details() {
            router = router.layer(middleware::map_response(attach_error_details));
        }

        let router = router
            .layer(body_limit(config.security.max_body_size))
            .layer(middleware::from_fn(metrics::track_requests));

        apply_security_headers(router, &config.security)
            .layer(cors_layer(&config.cors.allowed_origins(environment)))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span::<Body>)
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, GatewayRequestId))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = self.config.environment.as_str(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                // A closed channel means the coordinator is gone; stop as well.
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    use crate::config::UpstreamConfig;
    use crate::observability::logging::default_filter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

    impl<S: tracing::Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            self.0
                .lock()
                .unwrap()
                .push((*meta.level(), meta.target().to_string()));
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_responses_logged_at_default_level() {
        let captured = Captured::default();
        let subscriber = Registry::default()
            .with(EnvFilter::new(default_filter("info")))
            .with(captured.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let upstream = SupabaseClient::new(&UpstreamConfig {
            url: "http://127.0.0.1:9".into(),
            anon_key: "anon-key".into(),
            timeout_secs: None,
        })
        .unwrap();
        let server = GatewayServer::new(GatewayConfig::default(), Arc::new(upstream));

        let response = server
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let events = captured.0.lock().unwrap();
        assert!(
            events
                .iter()
                .any(|(level, target)| *level == Level::INFO && target.starts_with("tower_http::trace")),
            "{:?}",
            events
        );
    }
}
