//! Thin JSON/multipart wrapper over the backend REST endpoints.
//!
//! Authentication rides on the session cookie, so the underlying
//! [`reqwest::Client`] keeps a cookie store.

use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a cookie-aware client with the configured request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET` a JSON document.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        tracing::debug!(%path, "GET");
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Self::parse_response(response).await
    }

    /// `POST` without a body, discarding the response body.
    pub async fn post_empty(&self, path: &str) -> Result<(), ClientError> {
        tracing::debug!(%path, "POST");
        let response = self.client.post(self.url(path)).send().await?;
        Self::check_status(response).await
    }

    /// Send a multipart form and discard the response body.
    pub async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        form: Form,
    ) -> Result<(), ClientError> {
        let response = self.multipart_request(method, path, form).await?;
        Self::check_status(response).await
    }

    /// Send a multipart form and parse the JSON response.
    pub async fn send_multipart_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Form,
    ) -> Result<T, ClientError> {
        let response = self.multipart_request(method, path, form).await?;
        Self::parse_response(response).await
    }

    /// `PUT` a JSON body and parse the JSON response.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%path, "PUT");
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::parse_response(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        tracing::debug!(%path, "DELETE");
        let response = self.client.delete(self.url(path)).send().await?;
        Self::check_status(response).await
    }

    /// `DELETE` with a JSON body (bulk deletes).
    pub async fn delete_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        tracing::debug!(%path, "DELETE");
        let response = self.client.delete(self.url(path)).json(body).send().await?;
        Self::check_status(response).await
    }

    // ---- private helpers ----

    async fn multipart_request(
        &self,
        method: Method,
        path: &str,
        form: Form,
    ) -> Result<reqwest::Response, ClientError> {
        tracing::debug!(%method, %path, "multipart");
        Ok(self
            .client
            .request(method, self.url(path))
            .multipart(form)
            .send()
            .await?)
    }

    /// Map non-2xx statuses onto [`ClientError`]. 404 and 401 get their own
    /// variants; everything else keeps the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(response.url().path().to_string())),
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                Err(ClientError::Api {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
