//! Inference client factory for the hosted multimodal API.
//!
//! One `reqwest::Client` is created at startup and reused for every
//! request, so the connection pool stays warm across pipeline
//! invocations. Building a per-request [`InferenceClient`] only binds the
//! current credential — no network I/O happens until a completion is
//! actually issued.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;

use crate::credentials::CredentialStore;

/// Default remote endpoint (OpenAI-compatible).
pub const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn/v1";

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// A single chat-completion attempt can fail in these ways; all of them
/// are recoverable per-candidate failures from the pipeline's viewpoint.
#[derive(Debug, Error)]
pub enum ChatBackendError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not the expected JSON envelope.
    #[error("failed to decode API response: {0}")]
    Decode(String),

    /// The envelope parsed but carried no message content.
    #[error("response contained no message content")]
    MissingContent,
}

/// The seam between the failover pipeline and the wire.
///
/// Production uses [`InferenceClient`]; tests script responses without a
/// network.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Issue one chat completion and return the assistant's text.
    async fn complete(
        &self,
        model: &str,
        messages: &serde_json::Value,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ChatBackendError>;
}

/// HTTP client bound to the remote endpoint and a bearer credential.
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[async_trait]
impl ChatBackend for InferenceClient {
    async fn complete(
        &self,
        model: &str,
        messages: &serde_json::Value,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ChatBackendError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatBackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatBackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChatBackendError::Decode(e.to_string()))?;

        envelope["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(ChatBackendError::MissingContent)
    }
}

/// Builds [`InferenceClient`] instances from the current credential.
pub struct ClientFactory {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl ClientFactory {
    /// Create the factory and its shared HTTP client.
    pub fn new(base_url: impl Into<String>, credentials: Arc<CredentialStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
        })
    }

    /// Bind the current credential, or `None` when not configured.
    ///
    /// Callers must surface the absent case as a "not configured"
    /// condition; the factory never errors here.
    pub fn build(&self) -> Option<InferenceClient> {
        let api_key = self.credentials.get()?;
        Some(InferenceClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn factory_with(dir: &TempDir, secret: Option<&str>) -> ClientFactory {
        let store = Arc::new(CredentialStore::load(dir.path().join(".env")));
        if let Some(secret) = secret {
            store.set(secret).unwrap();
        }
        ClientFactory::new(DEFAULT_BASE_URL, store).unwrap()
    }

    #[test]
    fn build_returns_none_without_credential() {
        let dir = TempDir::new().unwrap();
        let factory = factory_with(&dir, None);
        assert!(factory.build().is_none());
    }

    #[test]
    fn build_returns_client_with_credential() {
        let dir = TempDir::new().unwrap();
        let factory = factory_with(&dir, Some("sk-test-key"));
        let client = factory.build().expect("client should be built");
        assert_eq!(client.api_key, "sk-test-key");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn build_observes_credential_updates() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(CredentialStore::load(dir.path().join(".env")));
        let factory = ClientFactory::new(DEFAULT_BASE_URL, store.clone()).unwrap();

        assert!(factory.build().is_none());
        store.set("sk-later").unwrap();
        assert_eq!(factory.build().unwrap().api_key, "sk-later");
    }

    #[tokio::test]
    async fn transport_failure_is_reported_as_transport_error() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(CredentialStore::load(dir.path().join(".env")));
        store.set("sk-test").unwrap();
        // Nothing listens on this port; the connection is refused fast.
        let factory = ClientFactory::new("http://127.0.0.1:9", store).unwrap();
        let client = factory.build().unwrap();

        let err = client
            .complete("some-model", &serde_json::json!([]), 16, 0.1)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatBackendError::Transport(_)));
    }
}
