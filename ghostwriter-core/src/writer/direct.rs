//! Writer backed directly by the completion API.

use super::{Writer, WriterError};
use crate::locale::Locale;
use async_trait::async_trait;
use completion::{Client, Request, Response};
use tracing::debug;

/// Sampling settings for story continuations.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Model override (defaults to the client's model).
    pub model: Option<String>,

    /// Maximum tokens per continuation.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 300,
            temperature: Some(0.7),
        }
    }
}

/// A completion together with the prompt that produced it.
#[derive(Debug, Clone)]
pub struct Generation {
    pub prompt: String,
    pub response: Response,
}

/// Writer that calls the completion API with the caller's credential.
#[derive(Clone)]
pub struct CompletionWriter {
    client: Client,
    config: WriterConfig,
}

impl CompletionWriter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config: WriterConfig::default(),
        }
    }

    /// Create a writer from the OPENAI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, WriterError> {
        Ok(Self::new(Client::from_env()?))
    }

    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Build the locale prompt for `window` and request a completion.
    pub async fn generate(&self, window: &str, locale: Locale) -> Result<Generation, WriterError> {
        let prompt = locale.prompt(window);

        let mut request = Request::new(prompt.clone()).with_max_tokens(self.config.max_tokens);
        if let Some(ref model) = self.config.model {
            request = request.with_model(model);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        debug!(
            model = request.model.as_deref().unwrap_or(self.client.model()),
            %locale,
            window_chars = window.chars().count(),
            "requesting continuation"
        );

        let response = self.client.complete(request).await?;
        Ok(Generation { prompt, response })
    }
}

#[async_trait]
impl Writer for CompletionWriter {
    async fn suggest(&self, window: &str, locale: Locale) -> Result<String, WriterError> {
        let generation = self.generate(window, locale).await?;
        Ok(generation.response.text().unwrap_or_default().to_string())
    }
}
