use crate::domain_model::SessionToken;
use crate::domain_port::{ApiResponse, TransportError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;

const JSON: &str = "application/json";

/// JSON-over-HTTP client bound to a fixed base url such as `http://host:9999/api`.
///
/// No retries; every non-transport outcome, 4xx and 5xx included, comes back as
/// an [`ApiResponse`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SessionToken>,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.url(path);
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON)
            .json(body);
        self.send("POST", url, request, token).await
    }

    pub async fn get(
        &self,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.url(path);
        let request = self.client.get(&url);
        self.send("GET", url, request, token).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: &'static str,
        url: String,
        request: RequestBuilder,
        token: Option<&SessionToken>,
    ) -> Result<ApiResponse, TransportError> {
        let request = match token {
            Some(token) => request.header(AUTHORIZATION, token.authorization_header()),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    method,
                    url: url.clone(),
                }
            } else {
                TransportError::Request {
                    method,
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| TransportError::Body {
            url: url.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(method, %url, %status, bytes = text.len(), "response");

        Ok(ApiResponse {
            status,
            body: parse_body(&text),
        })
    }
}

fn parse_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_owned()))
}
