//! Recognition endpoint: multipart image upload in, identified object and
//! estimated weight out.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use appstate::{AppState, ItemResult};

use crate::error::{ApiError, ApiResult};

/// Multipart form for `/recognize`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)] // schema-only type for the OpenAPI docs
pub struct RecognizeForm {
    /// Image file (JPEG or PNG)
    #[schema(value_type = String, format = Binary)]
    pub file: String,
    /// Optional model identifier; must match a pool entry to take effect
    pub model: Option<String>,
}

/// Successful recognition result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecognitionResponse {
    /// Common name of the recognized object
    pub item_name: String,
    /// Estimated weight in kilograms
    pub estimated_weight_kg: f64,
    /// The candidate model that produced this result
    pub used_model: String,
}

impl From<ItemResult> for RecognitionResponse {
    fn from(result: ItemResult) -> Self {
        Self {
            item_name: result.item_name,
            estimated_weight_kg: result.estimated_weight_kg,
            used_model: result.used_model,
        }
    }
}

/// Recognize the main object in an uploaded image.
#[utoipa::path(
    post,
    path = "/recognize",
    request_body(content = RecognizeForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Object recognized", body = RecognitionResponse),
        (status = 400, description = "Missing file, invalid image, or no API key configured"),
        (status = 500, description = "Upstream response escaped JSON parsing"),
        (status = 503, description = "All candidate models failed"),
    ),
    tag = "Recognition"
)]
pub async fn recognize(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<RecognitionResponse>> {
    let request_id = uuid::Uuid::new_v4();

    let mut file: Option<Vec<u8>> = None;
    let mut model: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart form: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;
                file = Some(bytes.to_vec());
            }
            Some("model") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read model field: {e}")))?;
                model = Some(text);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("No file part".to_string()))?;
    let model = model.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());

    tracing::info!(
        request_id = %request_id,
        size = file.len(),
        requested_model = ?model,
        "Recognition request received"
    );

    let result = state
        .recognize_upload(&file, model.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Recognition failed");
            ApiError::from(e)
        })?;

    tracing::info!(
        request_id = %request_id,
        item_name = %result.item_name,
        used_model = %result.used_model,
        "Recognition successful"
    );

    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_converts_from_item_result() {
        let result = ItemResult {
            item_name: "Red Apple".to_string(),
            estimated_weight_kg: 0.15,
            used_model: "Qwen/Qwen3-VL-8B-Instruct".to_string(),
        };
        let response = RecognitionResponse::from(result);
        assert_eq!(response.item_name, "Red Apple");
        assert_eq!(response.estimated_weight_kg, 0.15);
        assert_eq!(response.used_model, "Qwen/Qwen3-VL-8B-Instruct");
    }
}
