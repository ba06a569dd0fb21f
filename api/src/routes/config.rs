//! API key configuration routes (get status, set key).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use appstate::AppState;

use crate::error::{ApiError, ApiResult};

/// Credential status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConfigStatusResponse {
    /// Whether an API key is configured
    pub configured: bool,
    /// Masked form of the configured key, if any
    pub masked_key: Option<String>,
}

/// Request body for setting the API key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetApiKeyRequest {
    /// The SiliconFlow API key to persist
    pub api_key: String,
}

/// Confirmation of a stored API key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SetApiKeyResponse {
    pub success: bool,
    pub message: String,
    /// Masked form of the stored key; the raw secret is never echoed
    pub masked_key: String,
}

/// Report whether an API key is configured.
#[utoipa::path(
    get,
    path = "/config",
    responses(
        (status = 200, description = "Credential status", body = ConfigStatusResponse),
    ),
    tag = "Config"
)]
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigStatusResponse> {
    let (configured, masked_key) = state.credential_status();
    Json(ConfigStatusResponse {
        configured,
        masked_key,
    })
}

/// Persist the SiliconFlow API key.
#[utoipa::path(
    post,
    path = "/config",
    request_body = SetApiKeyRequest,
    responses(
        (status = 200, description = "API key stored", body = SetApiKeyResponse),
        (status = 400, description = "Empty API key"),
        (status = 500, description = "Persistence failure"),
    ),
    tag = "Config"
)]
pub async fn set_config(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SetApiKeyRequest>,
) -> ApiResult<Json<SetApiKeyResponse>> {
    let request_id = uuid::Uuid::new_v4();

    let masked_key = state.configure_credential(&payload.api_key).map_err(|e| {
        tracing::error!(request_id = %request_id, error = %e, "Failed to configure API key");
        ApiError::from(e)
    })?;

    tracing::info!(request_id = %request_id, masked_key = %masked_key, "API key configured");

    Ok(Json(SetApiKeyResponse {
        success: true,
        message: "API key configured successfully".to_string(),
        masked_key,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstate::AppStateConfig;
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> Arc<AppState> {
        Arc::new(
            AppState::new(AppStateConfig {
                env_file: dir.path().join(".env"),
                ..Default::default()
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn get_config_reports_unconfigured() {
        let dir = TempDir::new().unwrap();
        let Json(response) = get_config(State(state_in(&dir))).await;
        assert!(!response.configured);
        assert!(response.masked_key.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips_masked_key() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let Json(set_response) = set_config(
            State(state.clone()),
            Json(SetApiKeyRequest {
                api_key: "sk-1234567890abcdef".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(set_response.success);
        assert_eq!(set_response.masked_key, "sk-1...cdef");

        let Json(status) = get_config(State(state)).await;
        assert!(status.configured);
        assert_eq!(status.masked_key.as_deref(), Some("sk-1...cdef"));
    }

    #[tokio::test]
    async fn set_rejects_empty_key() {
        let dir = TempDir::new().unwrap();
        let result = set_config(
            State(state_in(&dir)),
            Json(SetApiKeyRequest {
                api_key: "   ".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
