//! Full server on an ephemeral port, exercised over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use campus_sdk::{CampusClient, ClientError, LoginBody, RegistroBody};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use campus_gateway::config::{Environment, GatewayConfig};
use campus_gateway::{GatewayServer, Shutdown};

mod common;
use common::InMemoryUpstream;

struct Running {
    base_url: String,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

async fn start(upstream: Arc<InMemoryUpstream>, config: GatewayConfig) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config, upstream);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));
    Running {
        base_url: format!("http://{}", addr),
        shutdown,
        handle,
    }
}

#[tokio::test]
async fn test_sdk_round_trip() {
    let upstream = Arc::new(InMemoryUpstream::seeded());
    let running = start(upstream.clone(), GatewayConfig::default()).await;
    let client = CampusClient::new(&running.base_url);

    let health = client.health().await.unwrap();
    assert_eq!(health["status"], "ok");

    let niveles = client.niveles().await.unwrap();
    assert_eq!(niveles["count"], 2);

    let cursos = client.cursos(Some("Media")).await.unwrap();
    assert_eq!(cursos["cursos"][0]["nombre"], "Física");
    assert_eq!(client.cursos_por_nivel(1).await.unwrap()["count"], 2);
    assert_eq!(client.lecciones(11).await.unwrap()["lecciones"][0]["nombre"], "Vocales");
    assert_eq!(client.instituciones().await.unwrap()["count"], 2);

    let registro = RegistroBody {
        nombre: "Luis".into(),
        apellido: "Gómez".into(),
        email: "luis@example.com".into(),
        password: "clave-segura".into(),
        codigo_institucion: "AN-2024".into(),
        grado: "7".into(),
    };
    let created = client.registro_estudiante(&registro).await.unwrap();
    assert_eq!(created["user"]["institucion"]["nombre"], "Academia Norte");

    match client.registro_estudiante(&registro).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "El email ya está registrado");
        }
        other => panic!("expected duplicate email rejection, got {:?}", other),
    }

    let login = client
        .login(&LoginBody {
            email: "luis@example.com".into(),
            password: "clave-segura".into(),
        })
        .await
        .unwrap();
    let token = login["session"]["access_token"].as_str().unwrap().to_string();

    let me = client.me(&token).await.unwrap();
    assert_eq!(me["user"]["nombre"], "Luis");
    assert_eq!(me["user"]["grado"], "7");

    client.logout(Some(&token)).await.unwrap();
    assert!(matches!(
        client.me(&token).await,
        Err(ClientError::Api { status: 401, .. })
    ));

    running.shutdown.trigger();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_response_headers() {
    let running = start(Arc::new(InMemoryUpstream::seeded()), GatewayConfig::default()).await;
    let http = reqwest::Client::new();

    let response = http
        .get(format!("{}/api/niveles", running.base_url))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("content-security-policy"));
    assert!(!headers["x-request-id"].is_empty());

    let response = http
        .get(format!("{}/", running.base_url))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me");

    let response = http
        .get(format!("{}/api/niveles", running.base_url))
        .header("origin", "https://evil.example")
        .send()
        .await
        .unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());

    running.shutdown.trigger();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_production_cors_uses_only_configured_origins() {
    let mut config = GatewayConfig {
        environment: Environment::Production,
        ..Default::default()
    };
    config.cors.frontend_origins = vec!["https://campus.example.org".into()];
    let running = start(Arc::new(InMemoryUpstream::seeded()), config).await;
    let http = reqwest::Client::new();

    let preflight = http
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/api/auth/login", running.base_url),
        )
        .header("origin", "https://campus.example.org")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(preflight.status().is_success());
    assert_eq!(
        preflight.headers()["access-control-allow-origin"],
        "https://campus.example.org"
    );

    let response = http
        .get(format!("{}/api/niveles", running.base_url))
        .header("origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());

    running.shutdown.trigger();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_body_limit() {
    let mut config = GatewayConfig::default();
    config.security.max_body_size = 1024;
    let running = start(Arc::new(InMemoryUpstream::seeded()), config).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/login", running.base_url))
        .json(&json!({"email": "ana@example.com", "password": "x".repeat(4096)}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    running.shutdown.trigger();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_not_found_over_http() {
    let running = start(Arc::new(InMemoryUpstream::new()), GatewayConfig::default()).await;

    let response = reqwest::get(format!("{}/no/existe", running.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["path"], "/no/existe");

    running.shutdown.trigger();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let running = start(Arc::new(InMemoryUpstream::new()), GatewayConfig::default()).await;
    let base_url = running.base_url.clone();

    running.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), running.handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    assert!(reqwest::get(format!("{}/", base_url)).await.is_err());
}
