//! Writer that goes through the backend's generate endpoint.

use super::{Writer, WriterError};
use crate::api::{ErrorBody, GenerateRequest, GenerateResponse};
use crate::locale::Locale;
use async_trait::async_trait;
use tracing::debug;

/// Calls `POST /api/generate` on a ghost writer server.
#[derive(Clone)]
pub struct RemoteWriter {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RemoteWriter {
    /// `endpoint` is the full URL of the generate route.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Writer for RemoteWriter {
    async fn suggest(&self, window: &str, locale: Locale) -> Result<String, WriterError> {
        let body = GenerateRequest {
            sentence: window.to_string(),
            language: locale,
            api_key: self.api_key.clone(),
        };

        debug!(endpoint = %self.endpoint, %locale, "posting to generate endpoint");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| WriterError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let text = response
                .text()
                .await
                .map_err(|e| WriterError::Network(e.to_string()))?;
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("Request failed with status {status}"));
            return Err(WriterError::Backend { status, message });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| WriterError::Parse(e.to_string()))?;

        Ok(parsed
            .result
            .completion
            .text()
            .unwrap_or_default()
            .to_string())
    }
}
