//! LLM provider adapters

pub mod anthropic;
pub mod openai;
pub mod stub;

pub use anthropic::AnthropicGateway;
pub use openai::OpenAiGateway;
pub use stub::StubGateway;

use eightify_domain::GenerationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Common LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-1.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.2,
            max_output_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

/// Which provider serves a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Claude models go to Anthropic, everything else to OpenAI
    pub fn from_model(model: &str) -> Self {
        if model.trim().to_ascii_lowercase().starts_with("claude") {
            ProviderKind::Anthropic
        } else {
            ProviderKind::OpenAi
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GenerationError::Network(format!("Failed to build HTTP client: {}", e)))
}

fn map_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Network(e.to_string())
    }
}

/// Map a non-success provider status to a generation error
fn status_error(status: reqwest::StatusCode, body: String) -> GenerationError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        GenerationError::Auth(format!("API returned {}: {}", status, body))
    } else {
        GenerationError::Api(format!("API returned {}: {}", status, body))
    }
}
