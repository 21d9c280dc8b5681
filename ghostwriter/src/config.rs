use clap::Parser;
use ghostwriter_core::WriterConfig;
use std::net::SocketAddr;

use crate::web::DEFAULT_MAX_STORIES;

/// Command line and environment configuration.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Address to bind the HTTP server
    #[arg(long, env = "GHOSTWRITER_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Root URL of the completion API
    #[arg(long, env = "OPENAI_API_BASE", default_value = completion::API_BASE)]
    pub api_base: String,

    /// Completion model to request
    #[arg(long, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Maximum tokens per continuation
    #[arg(long, default_value_t = 300)]
    pub max_tokens: usize,

    /// Stories hosted at once before new ones are refused
    #[arg(long, env = "GHOSTWRITER_MAX_STORIES", default_value_t = DEFAULT_MAX_STORIES)]
    pub max_stories: usize,
}

impl Cli {
    pub fn upstream(&self) -> Upstream {
        Upstream {
            api_base: self.api_base.clone(),
            writer: WriterConfig {
                model: self.model.clone(),
                max_tokens: self.max_tokens,
                temperature: Some(self.temperature),
            },
        }
    }
}

/// Where and how to reach the completion API.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub api_base: String,
    pub writer: WriterConfig,
}

impl Upstream {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            writer: WriterConfig::default(),
        }
    }
}

impl Default for Upstream {
    fn default() -> Self {
        Self::new(completion::API_BASE)
    }
}
