//! Application state for ScaleLens.
//!
//! This crate provides the central `AppState` struct that holds all shared
//! resources, plus the business logic behind the HTTP surface: image
//! validation, credential storage, the inference client factory, and the
//! model-failover pipeline.
//!
//! # Architecture
//!
//! `appstate` sits between the outbound inference API and the transport
//! layer:
//!
//! ```text
//! Transport layer (api)
//!          ↓
//!     appstate (this crate)
//!          ↓
//! Hosted inference API (reqwest)
//! ```
//!
//! The `api` crate depends on `appstate`; the server binary wires them
//! together. Nothing here depends back on the transport layer.

pub mod client;
pub mod credentials;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod state;

pub use client::{ChatBackend, ClientFactory, InferenceClient, DEFAULT_BASE_URL};
pub use credentials::{CredentialStore, CREDENTIAL_KEY};
pub use error::{CandidateAttempt, RecognitionError};
pub use image::ImageKind;
pub use pipeline::{ItemResult, ModelPool, DEFAULT_MODEL_POOL};
pub use state::{AppState, AppStateConfig};
