//! Minimal OpenAI-compatible text completion client.
//!
//! This crate provides a focused client for the legacy `/completions` API with:
//! - Non-streaming and streaming completions
//! - Configurable base URL for compatible servers
//! - Proper SSE parsing for streaming responses

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

pub const API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-instruct";
const DEFAULT_MAX_TOKENS: usize = 300;

/// Errors that can occur when using the completion client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Completion API client.
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Client {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Create a client from the OPENAI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| Error::NoApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API root (e.g. a local compatible server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a completion request and return the full response.
    pub async fn complete(&self, request: Request) -> Result<Response, Error> {
        self.post(&request, false)
            .await?
            .json::<Response>()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }

    /// Send a completion request and stream the generated text.
    pub async fn stream(
        &self,
        request: Request,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send>>, Error> {
        let response = self.post(&request, true).await?;
        Ok(Box::pin(sse_events(response.bytes_stream())))
    }

    /// POST to `/completions`, turning a non-success status into [`Error::Api`].
    async fn post(&self, request: &Request, stream: bool) -> Result<reqwest::Response, Error> {
        let headers = self.build_headers()?;
        let url = format!("{}/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&self.build_api_request(request, stream))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }

    fn build_api_request(&self, request: &Request, stream: bool) -> ApiRequest {
        ApiRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            prompt: request.prompt.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: request.stop.clone(),
            stream,
        }
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A completion request.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub prompt: String,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
    pub stop: Option<Vec<String>>,
}

impl Request {
    /// Create a new request for the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            stop: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// A completion response.
///
/// Serializable so callers can echo it back to their own clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Response {
    /// Text of the first candidate, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }
}

/// One candidate continuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    #[serde(default)]
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

// ============================================================================
// Streaming types
// ============================================================================

/// Events from a streaming response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextDelta {
        index: usize,
        text: String,
    },
    Finish {
        index: usize,
        reason: String,
    },
    Done,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    prompt: String,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChunk {
    choices: Vec<Choice>,
}

/// Pull `error.message` out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.to_string(),
    }
}

/// Turn a stream of body chunks into completion events.
///
/// Bytes are buffered until a full line arrives, so a multibyte character
/// split across chunks is decoded intact.
fn sse_events<S, B, E>(chunks: S) -> impl Stream<Item = Result<StreamEvent, Error>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    chunks
        .scan(Vec::<u8>::new(), |pending, chunk| {
            let parsed = match chunk {
                Ok(bytes) => {
                    pending.extend_from_slice(bytes.as_ref());
                    parse_sse_events_buffered(pending)
                }
                Err(e) => vec![Err(Error::Network(e.to_string()))],
            };
            futures::future::ready(Some(parsed))
        })
        .flat_map(futures::stream::iter)
}

/// Parse SSE events from a byte buffer, consuming complete lines and leaving
/// any trailing partial line in place.
fn parse_sse_events_buffered(buffer: &mut Vec<u8>) -> Vec<Result<StreamEvent, Error>> {
    let mut events = Vec::new();

    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=newline_pos).collect();
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim_end_matches(&['\n', '\r'][..]),
            Err(e) => {
                events.push(Err(Error::Parse(format!("SSE line is not UTF-8: {e}"))));
                continue;
            }
        };

        // Skip event: lines, comments and blank separators
        let Some(json_str) = line.strip_prefix("data: ") else {
            continue;
        };
        if json_str == "[DONE]" {
            events.push(Ok(StreamEvent::Done));
        } else if !json_str.is_empty() {
            match serde_json::from_str::<ApiStreamChunk>(json_str) {
                Ok(chunk) => events.extend(convert_stream_chunk(chunk).into_iter().map(Ok)),
                Err(e) => events.push(Err(Error::Parse(format!("SSE parse error: {e}")))),
            }
        }
    }

    events
}

fn convert_stream_chunk(chunk: ApiStreamChunk) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    for choice in chunk.choices {
        if !choice.text.is_empty() {
            events.push(StreamEvent::TextDelta {
                index: choice.index,
                text: choice.text,
            });
        }
        if let Some(reason) = choice.finish_reason {
            events.push(StreamEvent::Finish {
                index: choice.index,
                reason,
            });
        }
    }
    events
}
