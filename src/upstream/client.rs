//! HTTP client for the managed backend's data and auth APIs.
//!
//! # Responsibilities
//! - Issue table reads/inserts against `/rest/v1`
//! - Issue signup, password grant, user lookup and logout against `/auth/v1`
//! - Map transport failures, timeouts and non-2xx answers to [`UpstreamError`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::query::Query;
use crate::upstream::types::{
    extract_error_message, AuthSession, AuthUser, SignUpRequest, SignUpResponse, UpstreamError,
    UpstreamResult,
};
use crate::upstream::Upstream;

/// Client for a hosted backend project.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
    timeout_secs: Option<u64>,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// Fails when the URL is not absolute http(s) or the key is empty.
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let mut base_url = Url::parse(config.url.trim()).map_err(|e| {
            UpstreamError::Unavailable(format!("invalid project URL '{}': {}", config.url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(UpstreamError::Unavailable(format!(
                "unsupported project URL scheme '{}'",
                base_url.scheme()
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        if config.anon_key.trim().is_empty() {
            return Err(UpstreamError::Unavailable("missing project access key".into()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| UpstreamError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        tracing::info!(
            base_url = %base_url,
            timeout_secs = ?config.timeout_secs,
            "Upstream client initialized"
        );

        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key.trim().to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> UpstreamResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| UpstreamError::Unavailable(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Request carrying the project key, authorized as the project itself.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Request carrying the project key, authorized as the token's user.
    fn user_request(&self, method: Method, url: Url, access_token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> UpstreamResult<Response> {
        let result = match request.send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let message = extract_error_message(&body);
                if status.is_client_error() {
                    Err(UpstreamError::Rejected {
                        status: status.as_u16(),
                        message,
                    })
                } else {
                    Err(UpstreamError::Unavailable(format!("{}: {}", status, message)))
                }
            }
            Err(e) if e.is_timeout() => Err(UpstreamError::Timeout(self.timeout_secs.unwrap_or(0))),
            Err(e) => Err(UpstreamError::Unavailable(e.to_string())),
        };

        match &result {
            Ok(_) => metrics::record_upstream_call(operation, "ok"),
            Err(e) => {
                let outcome = match e {
                    UpstreamError::Rejected { .. } => "rejected",
                    UpstreamError::Timeout(_) => "timeout",
                    _ => "error",
                };
                metrics::record_upstream_call(operation, outcome);
                tracing::debug!(operation, error = %e, "Upstream call failed");
            }
        }
        result
    }

    async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> UpstreamResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(format!("{}: {}", operation, e)))
    }
}

#[async_trait]
impl Upstream for SupabaseClient {
    async fn select(&self, query: &Query) -> UpstreamResult<Vec<Value>> {
        let url = self.endpoint(&format!("rest/v1/{}", query.table()))?;
        let request = self.request(Method::GET, url).query(&query.to_params());
        let response = self.send("select", request).await?;
        Self::decode("select", response).await
    }

    async fn insert(&self, table: &str, row: Value) -> UpstreamResult<Value> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&row);
        let response = self.send("insert", request).await?;
        let rows: Vec<Value> = Self::decode("insert", response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Decode(format!("insert into {} returned no rows", table)))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> UpstreamResult<AuthUser> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .send("sign_up", self.request(Method::POST, url).json(request))
            .await?;
        let body: SignUpResponse = Self::decode("sign_up", response).await?;
        Ok(body.into_user())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> UpstreamResult<AuthSession> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let body = json!({ "email": email, "password": password });
        let response = self
            .send("sign_in", self.request(Method::POST, url).json(&body))
            .await?;
        Self::decode("sign_in", response).await
    }

    async fn get_user(&self, access_token: &str) -> UpstreamResult<AuthUser> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .send("get_user", self.user_request(Method::GET, url, access_token))
            .await?;
        Self::decode("get_user", response).await
    }

    async fn sign_out(&self, access_token: &str) -> UpstreamResult<()> {
        let url = self.endpoint("auth/v1/logout")?;
        self.send("sign_out", self.user_request(Method::POST, url, access_token))
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}
