use crate::domain_model::*;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Network-level failure. An HTTP error status is never reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot build http client: {0}")]
    Build(String),
    #[error("{method} {url} timed out")]
    Timeout { method: &'static str, url: String },
    #[error("{method} {url} failed: {message}")]
    Request {
        method: &'static str,
        url: String,
        message: String,
    },
    #[error("cannot read response body of {url}: {message}")]
    Body { url: String, message: String },
    #[error("response body does not match the expected shape: {0}")]
    UnexpectedBody(String),
}

/// Status and body of a completed exchange, whatever the status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| TransportError::UnexpectedBody(e.to_string()))
    }

    /// String field of a JSON object body.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.body.get(name).and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationRequest {
    pub login: String,
    pub code: String,
}

/// Card numbers and an amount in minor units.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: i64,
}

/// Endpoints of the banking service under test.
#[async_trait::async_trait]
pub trait BankApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, TransportError>;

    async fn verify(&self, request: &VerificationRequest) -> Result<ApiResponse, TransportError>;

    async fn cards(&self, token: &SessionToken) -> Result<ApiResponse, TransportError>;

    async fn transfer(
        &self,
        token: &SessionToken,
        request: &TransferRequest,
    ) -> Result<ApiResponse, TransportError>;
}
