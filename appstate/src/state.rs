//! Shared application state: the dependency-injection root that wires the
//! credential store, client factory, and model pool into the operations
//! the HTTP layer calls.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::client::{ClientFactory, DEFAULT_BASE_URL};
use crate::credentials::CredentialStore;
use crate::error::RecognitionError;
use crate::image;
use crate::pipeline::{self, ItemResult, ModelPool};

/// Construction parameters for [`AppState`].
#[derive(Debug, Clone)]
pub struct AppStateConfig {
    /// Path of the key-value file holding the API credential.
    pub env_file: PathBuf,
    /// Base URL of the inference API.
    pub base_url: String,
}

impl Default for AppStateConfig {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Application state shared across requests.
///
/// Holds no per-request data; concurrent requests only share the
/// credential snapshot (swapped atomically on update) and the HTTP
/// connection pool.
pub struct AppState {
    pool: ModelPool,
    credentials: Arc<CredentialStore>,
    factory: ClientFactory,
}

impl AppState {
    /// Wire up the state from configuration. No network I/O.
    pub fn new(config: AppStateConfig) -> Result<Self> {
        let credentials = Arc::new(CredentialStore::load(&config.env_file));
        let factory = ClientFactory::new(&config.base_url, credentials.clone())?;

        Ok(Self {
            pool: ModelPool::default(),
            credentials,
            factory,
        })
    }

    /// The configured model pool, in priority order.
    pub fn models(&self) -> &[String] {
        self.pool.models()
    }

    /// Validate an upload and run the failover pipeline over it.
    pub async fn recognize_upload(
        &self,
        image_bytes: &[u8],
        requested_model: Option<&str>,
    ) -> Result<ItemResult, RecognitionError> {
        let kind = image::validate(image_bytes)?;

        let client = self.factory.build().ok_or(RecognitionError::NotConfigured)?;

        let (result, attempts) =
            pipeline::recognize(&client, &self.pool, image_bytes, kind, requested_model).await?;

        if !attempts.is_empty() {
            tracing::debug!(
                failed = attempts.len(),
                used_model = %result.used_model,
                "Recognition recovered after candidate failures"
            );
        }
        Ok(result)
    }

    /// Whether a credential is configured, plus its masked form.
    pub fn credential_status(&self) -> (bool, Option<String>) {
        (self.credentials.is_configured(), self.credentials.masked())
    }

    /// Persist a new API credential; returns the masked form.
    pub fn configure_credential(&self, secret: &str) -> Result<String, RecognitionError> {
        self.credentials.set(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> AppState {
        AppState::new(AppStateConfig {
            env_file: dir.path().join(".env"),
            base_url: "http://127.0.0.1:9".to_string(),
        })
        .unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let img = ::image::DynamicImage::new_rgb8(2, 2);
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ::image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn recognize_without_credential_is_not_configured() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let err = state.recognize_upload(&png_bytes(), None).await.unwrap_err();
        assert!(matches!(err, RecognitionError::NotConfigured));
    }

    #[tokio::test]
    async fn recognize_validates_before_building_client() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        // Invalid image loses to validation even though no credential is set.
        let err = state.recognize_upload(b"not an image", None).await.unwrap_err();
        assert!(matches!(err, RecognitionError::UnreadableImage { .. }));
    }

    #[tokio::test]
    async fn recognize_with_unreachable_endpoint_exhausts_the_pool() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        state.configure_credential("sk-test-key").unwrap();

        let err = state.recognize_upload(&png_bytes(), None).await.unwrap_err();
        match err {
            RecognitionError::AllCandidatesFailed { attempts } => {
                assert_eq!(attempts.len(), state.models().len());
            }
            other => panic!("expected AllCandidatesFailed, got {other:?}"),
        }
    }

    #[test]
    fn credential_status_round_trips() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        assert_eq!(state.credential_status(), (false, None));

        let masked = state.configure_credential("sk-1234567890abcdef").unwrap();
        let (configured, status_mask) = state.credential_status();
        assert!(configured);
        assert_eq!(status_mask.as_deref(), Some(masked.as_str()));
    }
}
