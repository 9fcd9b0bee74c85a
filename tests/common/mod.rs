//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use campus_gateway::config::{Environment, GatewayConfig};
use campus_gateway::upstream::{
    AuthSession, AuthUser, Query, SignUpRequest, Upstream, UpstreamError, UpstreamResult,
};
use campus_gateway::GatewayServer;

struct Account {
    user: AuthUser,
    password: String,
}

/// Upstream double holding tables and accounts in memory.
#[derive(Default)]
pub struct InMemoryUpstream {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    accounts: Mutex<Vec<Account>>,
    sessions: Mutex<HashMap<String, String>>,
    failing_tables: Mutex<HashSet<String>>,
    fail_inserts: Mutex<bool>,
    fail_auth: Mutex<bool>,
    pub sign_up_calls: AtomicUsize,
    pub select_calls: AtomicUsize,
}

impl InMemoryUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with a mix of active and inactive rows, deliberately out of order.
    pub fn seeded() -> Self {
        let upstream = Self::new();
        upstream.set_table(
            "niveles",
            vec![
                json!({"id": 3, "nombre": "Media", "descripcion": "Grados 10 y 11", "orden_nivel": 3, "activo": true}),
                json!({"id": 1, "nombre": "Primaria", "descripcion": "Grados 1 a 5", "orden_nivel": 1, "activo": true}),
                json!({"id": 2, "nombre": "Secundaria", "descripcion": "Grados 6 a 9", "orden_nivel": 2, "activo": false}),
            ],
        );
        upstream.set_table(
            "cursos",
            vec![
                json!({"id": 10, "nivel_id": 1, "nombre": "Matemáticas", "descripcion": null, "orden_curso": 2, "activo": true}),
                json!({"id": 11, "nivel_id": 1, "nombre": "Lenguaje", "descripcion": "Lectura", "orden_curso": 1, "activo": true}),
                json!({"id": 12, "nivel_id": 1, "nombre": "Arte", "descripcion": null, "orden_curso": 3, "activo": false}),
                json!({"id": 13, "nivel_id": 3, "nombre": "Física", "descripcion": null, "orden_curso": 1, "activo": true}),
            ],
        );
        upstream.set_table(
            "lecciones",
            vec![
                json!({"id": 100, "curso_id": 10, "nombre": "Sumas", "descripcion": null, "orden_leccion": 2, "activo": true}),
                json!({"id": 101, "curso_id": 10, "nombre": "Conteo", "descripcion": null, "orden_leccion": 1, "activo": true}),
                json!({"id": 102, "curso_id": 10, "nombre": "Borrador", "descripcion": null, "orden_leccion": 3, "activo": false}),
                json!({"id": 103, "curso_id": 11, "nombre": "Vocales", "descripcion": null, "orden_leccion": 1, "activo": true}),
            ],
        );
        upstream.set_table(
            "instituciones",
            vec![
                json!({"id": 1, "nombre": "Colegio Central", "codigo_acceso": "CC-2024", "activo": true}),
                json!({"id": 2, "nombre": "Academia Norte", "codigo_acceso": "AN-2024", "activo": true}),
                json!({"id": 3, "nombre": "Escuela Cerrada", "codigo_acceso": "EC-2020", "activo": false}),
            ],
        );
        upstream.set_table("usuarios", Vec::new());
        upstream
    }

    pub fn set_table(&self, table: &str, rows: Vec<Value>) {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    /// Make every read of `table` fail as if the service were down.
    pub fn fail_table(&self, table: &str) {
        self.failing_tables.lock().unwrap().insert(table.to_string());
    }

    pub fn fail_inserts(&self) {
        *self.fail_inserts.lock().unwrap() = true;
    }

    /// Make every auth call fail as if the service were down.
    pub fn fail_auth(&self) {
        *self.fail_auth.lock().unwrap() = true;
    }

    /// Create an account directly, bypassing registration.
    pub fn add_account(&self, email: &str, password: &str, metadata: Value) -> String {
        let mut accounts = self.accounts.lock().unwrap();
        let id = format!("user-{}", accounts.len() + 1);
        accounts.push(Account {
            user: AuthUser {
                id: id.clone(),
                email: Some(email.to_string()),
                user_metadata: metadata.as_object().cloned().unwrap_or_default(),
                created_at: Some("2024-01-01T00:00:00Z".to_string()),
            },
            password: password.to_string(),
        });
        id
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    fn check_auth(&self) -> UpstreamResult<()> {
        if *self.fail_auth.lock().unwrap() {
            return Err(UpstreamError::Unavailable("auth service down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Upstream for InMemoryUpstream {
    async fn select(&self, query: &Query) -> UpstreamResult<Vec<Value>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_tables.lock().unwrap().contains(query.table()) {
            return Err(UpstreamError::Unavailable("connection refused".into()));
        }
        let tables = self.tables.lock().unwrap();
        let rows = tables.get(query.table()).ok_or_else(|| UpstreamError::Rejected {
            status: 404,
            message: format!("relation \"{}\" does not exist", query.table()),
        })?;
        Ok(query.apply(rows))
    }

    async fn insert(&self, table: &str, row: Value) -> UpstreamResult<Value> {
        if *self.fail_inserts.lock().unwrap() {
            return Err(UpstreamError::Unavailable("insert failed".into()));
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> UpstreamResult<AuthUser> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        self.check_auth()?;
        let exists = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.user.email.as_deref() == Some(request.email.as_str()));
        if exists {
            return Err(UpstreamError::Rejected {
                status: 422,
                message: "User already registered".into(),
            });
        }
        let metadata = Value::Object(request.data.clone());
        let id = self.add_account(&request.email, &request.password, metadata);
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
            .ok_or_else(|| UpstreamError::Decode("account vanished".into()))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> UpstreamResult<AuthSession> {
        self.check_auth()?;
        let user = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .map(|a| a.user.clone())
            .ok_or_else(|| UpstreamError::Rejected {
                status: 400,
                message: "Invalid login credentials".into(),
            })?;
        let token = format!("token-{}", user.id);
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), user.id.clone());
        Ok(AuthSession {
            access_token: token,
            refresh_token: Some(format!("refresh-{}", user.id)),
            expires_in: Some(3600),
            expires_at: Some(1_700_003_600),
            token_type: Some("bearer".into()),
            user,
        })
    }

    async fn get_user(&self, access_token: &str) -> UpstreamResult<AuthUser> {
        self.check_auth()?;
        let user_id = self
            .sessions
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| UpstreamError::Rejected {
                status: 401,
                message: "invalid JWT".into(),
            })?;
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| UpstreamError::Rejected {
                status: 404,
                message: "User not found".into(),
            })
    }

    async fn sign_out(&self, access_token: &str) -> UpstreamResult<()> {
        self.check_auth()?;
        match self.sessions.lock().unwrap().remove(access_token) {
            Some(_) => Ok(()),
            None => Err(UpstreamError::Rejected {
                status: 401,
                message: "invalid JWT".into(),
            }),
        }
    }
}

/// Fully layered router over `upstream`.
pub fn router(upstream: Arc<InMemoryUpstream>, environment: Environment) -> Router {
    let config = GatewayConfig {
        environment,
        ..Default::default()
    };
    GatewayServer::new(config, upstream).router()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(path).body(Body::empty()).unwrap()).await
}

pub async fn get_with_token(app: &Router, path: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// A complete, valid registration body.
pub fn registro(email: &str) -> Value {
    json!({
        "nombre": "Ana",
        "apellido": "Pérez",
        "email": email,
        "password": "secreto123",
        "codigo_institucion": "CC-2024",
        "grado": "5"
    })
}

pub fn metadata(pairs: &[(&str, Value)]) -> Value {
    let map: Map<String, Value> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    Value::Object(map)
}
