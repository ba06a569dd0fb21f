//! Failover request pipeline: sequential attempts across a prioritized
//! pool of remote vision models until one returns a schema-valid result.
//!
//! Models in the pool vary in availability and output discipline. Trying
//! the caller's preferred model first preserves intent; falling back
//! silently preserves availability. Each candidate gets exactly one
//! attempt — no retries, no backoff — so the worst case is bounded by
//! pool size times the client timeout.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::client::ChatBackend;
use crate::error::{CandidateAttempt, RecognitionError};
use crate::image::ImageKind;

/// Candidate models, in priority order. The first entry is the default.
pub const DEFAULT_MODEL_POOL: [&str; 8] = [
    "Qwen/Qwen3-VL-32B-Instruct",
    "Qwen/Qwen3-VL-32B-Thinking",
    "Qwen/Qwen3-VL-8B-Instruct",
    "Qwen/Qwen3-VL-8B-Thinking",
    "Qwen/Qwen3-VL-235B-A22B-Instruct",
    "Qwen/Qwen3-VL-235B-A22B-Thinking",
    "Qwen/Qwen3-Omni-30B-A3B-Instruct",
    "Qwen/Qwen3-Omni-30B-A3B-Thinking",
];

/// Bounded output length for every candidate request.
const MAX_COMPLETION_TOKENS: u32 = 256;

/// Low temperature keeps the JSON output deterministic.
const SAMPLING_TEMPERATURE: f32 = 0.1;

/// Instruction forcing the model to emit only the two-key JSON object.
const SYSTEM_PROMPT: &str = "\
You are an object recognition expert.
Analyze the user's image and identify the single main object.
Respond ONLY with a valid JSON object. Do not add any text before or after the JSON.
The JSON object must have exactly two keys:
1. \"item_name\": (string) The common name of the object.
2. \"estimated_weight_kg\": (float) The estimated weight of the object in kilograms.

Example:
{
  \"item_name\": \"Red Apple\",
  \"estimated_weight_kg\": 0.15
}";

/// Ordered, duplicate-free list of remote model identifiers, fixed at
/// startup.
#[derive(Debug, Clone)]
pub struct ModelPool {
    models: Vec<String>,
}

impl Default for ModelPool {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODEL_POOL.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl ModelPool {
    /// Build a pool from explicit identifiers.
    ///
    /// The pool must be non-empty and free of duplicates; both are
    /// configuration errors caught at startup.
    pub fn new(models: Vec<String>) -> anyhow::Result<Self> {
        anyhow::ensure!(!models.is_empty(), "model pool must not be empty");
        let mut seen = std::collections::HashSet::new();
        for model in &models {
            anyhow::ensure!(seen.insert(model.as_str()), "duplicate model '{model}' in pool");
        }
        Ok(Self { models })
    }

    /// Whether `model` is a member of the pool.
    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// All pool members, in priority order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Ordered-unique candidate list for one request.
    ///
    /// A requested model that is a pool member goes first; otherwise the
    /// pool default leads. The rest follow in pool order, excluding
    /// whichever was placed first.
    pub fn candidates(&self, requested: Option<&str>) -> Vec<String> {
        let first = requested
            .map(str::trim)
            .filter(|m| !m.is_empty() && self.contains(m))
            .unwrap_or_else(|| self.models[0].as_str());

        std::iter::once(first.to_string())
            .chain(
                self.models
                    .iter()
                    .filter(|m| m.as_str() != first)
                    .cloned(),
            )
            .collect()
    }
}

/// The externally returned recognition artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    /// Common name of the recognized object.
    pub item_name: String,
    /// Estimated weight in kilograms, as reported by the model.
    pub estimated_weight_kg: f64,
    /// The candidate model that produced this result.
    pub used_model: String,
}

/// Run the failover pipeline over the candidate list.
///
/// Returns the first schema-valid result together with the attempts that
/// failed before it (for diagnostics). When every candidate fails, the
/// full ordered attempt log comes back in
/// [`RecognitionError::AllCandidatesFailed`].
pub async fn recognize<B: ChatBackend>(
    backend: &B,
    pool: &ModelPool,
    image_bytes: &[u8],
    kind: ImageKind,
    requested_model: Option<&str>,
) -> Result<(ItemResult, Vec<CandidateAttempt>), RecognitionError> {
    let candidates = pool.candidates(requested_model);
    let messages = build_messages(&data_url(image_bytes, kind));

    let mut attempts: Vec<CandidateAttempt> = Vec::new();

    for model in &candidates {
        match try_candidate(backend, model, &messages).await {
            Ok(parsed) => {
                // Key presence was proven in the loop; a type mismatch
                // here is the one parse failure that escapes per-candidate
                // handling and surfaces as a server error.
                let item_name = parsed["item_name"].as_str().ok_or_else(|| {
                    RecognitionError::MalformedUpstreamJson {
                        model: model.clone(),
                        reason: "'item_name' is not a string".to_string(),
                    }
                })?;
                let estimated_weight_kg =
                    parsed["estimated_weight_kg"].as_f64().ok_or_else(|| {
                        RecognitionError::MalformedUpstreamJson {
                            model: model.clone(),
                            reason: "'estimated_weight_kg' is not a number".to_string(),
                        }
                    })?;

                tracing::info!(
                    model = %model,
                    failed_before = attempts.len(),
                    "Recognition succeeded"
                );

                return Ok((
                    ItemResult {
                        item_name: item_name.to_string(),
                        estimated_weight_kg,
                        used_model: model.clone(),
                    },
                    attempts,
                ));
            }
            Err(error) => {
                tracing::warn!(model = %model, error = %error, "Candidate model failed, trying next");
                attempts.push(CandidateAttempt::new(model.clone(), error));
            }
        }
    }

    tracing::error!(
        attempted = attempts.len(),
        "All candidate models exhausted without a valid result"
    );
    Err(RecognitionError::AllCandidatesFailed { attempts })
}

/// One attempt against one candidate; every failure mode here is
/// recoverable by moving on to the next candidate.
async fn try_candidate<B: ChatBackend>(
    backend: &B,
    model: &str,
    messages: &serde_json::Value,
) -> Result<serde_json::Value, String> {
    let text = backend
        .complete(model, messages, MAX_COMPLETION_TOKENS, SAMPLING_TEMPERATURE)
        .await
        .map_err(|e| e.to_string())?;

    let cleaned = strip_code_fence(&text);
    let parsed: serde_json::Value = serde_json::from_str(cleaned.trim())
        .map_err(|e| format!("response was not valid JSON: {e}"))?;

    if !parsed.is_object() {
        return Err("response was not a JSON object".to_string());
    }
    for key in ["item_name", "estimated_weight_kg"] {
        if parsed.get(key).is_none() {
            return Err(format!("response missing required key '{key}'"));
        }
    }
    if let Some(weight) = parsed["estimated_weight_kg"].as_f64() {
        if weight < 0.0 {
            return Err(format!("estimated_weight_kg is negative ({weight})"));
        }
    }

    Ok(parsed)
}

/// Strip a markdown ```json fence, the common failure mode of models that
/// wrap JSON even when told not to. Content is taken strictly between the
/// first opening marker and the first closing marker; fence-free text
/// passes through unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    match text.find("```json") {
        Some(start) => {
            let after = &text[start + "```json".len()..];
            match after.find("```") {
                Some(end) => &after[..end],
                None => after,
            }
        }
        None => text,
    }
}

/// Encode the validated image as a `data:` URL for the user message.
fn data_url(bytes: &[u8], kind: ImageKind) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", kind.mime_type(), payload)
}

/// The fixed two-message conversation: system instruction plus the image.
fn build_messages(image_url: &str) -> serde_json::Value {
    serde_json::json!([
        { "role": "system", "content": SYSTEM_PROMPT },
        {
            "role": "user",
            "content": [
                { "type": "image_url", "image_url": { "url": image_url } }
            ]
        }
    ])
}
