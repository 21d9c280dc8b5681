//! Wire types for the generate endpoint.
//!
//! Shared by the server that exposes the endpoint and by [`RemoteWriter`]
//! which calls it.
//!
//! [`RemoteWriter`]: crate::writer::RemoteWriter

use crate::locale::Locale;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// The prompt window text.
    pub sentence: String,
    #[serde(default)]
    pub language: Locale,
    #[serde(default, alias = "credential")]
    pub api_key: String,
}

/// Successful reply from `POST /api/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub result: GenerateResult,
}

/// The completion as returned upstream, plus the prompt that was sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResult {
    #[serde(flatten)]
    pub completion: completion::Response,
    #[serde(default)]
    pub prompt: String,
}

/// Error reply: `{ "error": { "message": ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
            },
        }
    }
}
