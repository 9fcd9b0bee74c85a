use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with `success: false`.
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistroBody {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub password: String,
    pub codigo_institucion: String,
    pub grado: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

pub struct CampusClient {
    client: Client,
    base_url: String,
}

impl CampusClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await?;
        Self::read(response).await
    }

    async fn read(response: Response) -> Result<Value, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    /// `GET /api/health`
    pub async fn health(&self) -> Result<Value, ClientError> {
        self.send(self.client.get(self.url("/api/health"))).await
    }

    pub async fn niveles(&self) -> Result<Value, ClientError> {
        self.send(self.client.get(self.url("/api/niveles"))).await
    }

    /// Courses, optionally restricted to a level by name.
    pub async fn cursos(&self, nivel: Option<&str>) -> Result<Value, ClientError> {
        let mut request = self.client.get(self.url("/api/cursos"));
        if let Some(nivel) = nivel {
            request = request.query(&[("nivel", nivel)]);
        }
        self.send(request).await
    }

    pub async fn cursos_por_nivel(&self, nivel_id: i64) -> Result<Value, ClientError> {
        self.send(self.client.get(self.url(&format!("/api/cursos/{}", nivel_id))))
            .await
    }

    pub async fn lecciones(&self, curso_id: i64) -> Result<Value, ClientError> {
        self.send(self.client.get(self.url(&format!("/api/lecciones/{}", curso_id))))
            .await
    }

    pub async fn instituciones(&self) -> Result<Value, ClientError> {
        self.send(self.client.get(self.url("/api/instituciones"))).await
    }

    pub async fn registro_estudiante(&self, body: &RegistroBody) -> Result<Value, ClientError> {
        self.send(
            self.client
                .post(self.url("/api/auth/registro-estudiante"))
                .json(body),
        )
        .await
    }

    /// Password login; the token is at `session.access_token`.
    pub async fn login(&self, body: &LoginBody) -> Result<Value, ClientError> {
        self.send(self.client.post(self.url("/api/auth/login")).json(body))
            .await
    }

    pub async fn me(&self, access_token: &str) -> Result<Value, ClientError> {
        self.send(
            self.client
                .get(self.url("/api/auth/me"))
                .bearer_auth(access_token),
        )
        .await
    }

    pub async fn logout(&self, access_token: Option<&str>) -> Result<Value, ClientError> {
        let mut request = self.client.post(self.url("/api/auth/logout"));
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = CampusClient::new("http://localhost:3000/");
        assert_eq!(client.url("/api/niveles"), "http://localhost:3000/api/niveles");
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = CampusClient::new("http://127.0.0.1:9");
        assert!(matches!(client.niveles().await, Err(ClientError::Transport(_))));
    }
}
