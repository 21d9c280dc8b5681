//! The ghost writer: whatever suggests the next sentence.
//!
//! The turn controller only sees the [`Writer`] trait. Implementations either
//! call the completion API directly ([`CompletionWriter`]) or go through the
//! backend's generate endpoint ([`RemoteWriter`]).

mod direct;
mod remote;

pub use self::direct::{CompletionWriter, Generation, WriterConfig};
pub use self::remote::RemoteWriter;

use crate::locale::Locale;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a writer call.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Completion API error: {0}")]
    Completion(#[from] completion::Error),

    #[error("Request failed with status {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl WriterError {
    /// HTTP-like status of the failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            WriterError::Completion(completion::Error::Api { status, .. }) => Some(*status),
            WriterError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            WriterError::Completion(completion::Error::Api { message, .. }) => message.clone(),
            WriterError::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Something that can continue a story.
#[async_trait]
pub trait Writer: Send + Sync {
    /// Suggest a continuation of `window` in `locale`.
    ///
    /// Returns the raw text of the first candidate, or an empty string when
    /// the service produced no candidates.
    async fn suggest(&self, window: &str, locale: Locale) -> Result<String, WriterError>;
}
