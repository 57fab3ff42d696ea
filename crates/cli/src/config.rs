//! Configuration loading and management

use anyhow::{Context, Result};
use eightify_adapters::cache::CachePolicy;
use eightify_adapters::llm::LlmConfig as AdapterLlmConfig;
use eightify_adapters::youtube::YouTubeConfig as AdapterYouTubeConfig;
use eightify_domain::usecases::InsightConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub youtube: YouTubeConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub insights: InsightsConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Characters of each prompt and response shown in debug logs
    #[serde(default = "default_log_prompt_length")]
    pub log_prompt_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// `api` or `stub`
    #[serde(default = "default_youtube_source")]
    pub source: String,

    #[serde(default = "default_youtube_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,

    #[serde(default = "default_transcript_base_url")]
    pub transcript_base_url: String,

    #[serde(default = "default_transcript_language")]
    pub transcript_language: String,

    #[serde(default = "default_youtube_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `auto` picks the provider from the model name
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default = "default_anthropic_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    #[serde(default = "default_max_topics")]
    pub max_topics: usize,

    #[serde(default = "default_min_comments")]
    pub min_comments: usize,

    #[serde(default = "default_max_comments")]
    pub max_comments: usize,

    /// 0 sends the whole transcript
    #[serde(default = "default_max_transcript_length")]
    pub max_transcript_length: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 0 keeps every video until restart
    #[serde(default)]
    pub max_videos: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_prompt_length() -> usize {
    100
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_youtube_source() -> String {
    "api".to_string()
}

fn default_youtube_api_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_transcript_base_url() -> String {
    "https://www.youtube.com/api".to_string()
}

fn default_transcript_language() -> String {
    "en".to_string()
}

fn default_youtube_timeout() -> u64 {
    30
}

fn default_provider() -> String {
    "auto".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_openai_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_max_points() -> usize {
    5
}

fn default_max_topics() -> usize {
    5
}

fn default_min_comments() -> usize {
    10
}

fn default_max_comments() -> usize {
    100
}

fn default_max_transcript_length() -> usize {
    20_000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_prompt_length: default_log_prompt_length(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            source: default_youtube_source(),
            api_key_env: default_youtube_api_key_env(),
            base_url: default_youtube_base_url(),
            transcript_base_url: default_transcript_base_url(),
            transcript_language: default_transcript_language(),
            timeout_secs: default_youtube_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_llm_timeout(),
            openai: OpenAiConfig::default(),
            anthropic: AnthropicConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_api_key_env(),
            base_url: default_openai_base_url(),
        }
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_anthropic_api_key_env(),
            base_url: default_anthropic_base_url(),
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            max_points: default_max_points(),
            max_topics: default_max_topics(),
            min_comments: default_min_comments(),
            max_comments: default_max_comments(),
            max_transcript_length: default_max_transcript_length(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("EIGHTIFY")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn insight_config(&self) -> InsightConfig {
        InsightConfig {
            max_points: self.insights.max_points,
            max_topics: self.insights.max_topics,
            min_comments: self.insights.min_comments,
            max_comments: self.insights.max_comments,
            max_transcript_length: match self.insights.max_transcript_length {
                0 => None,
                n => Some(n),
            },
            log_prompt_length: self.general.log_prompt_length,
        }
    }

    pub fn youtube_adapter_config(&self) -> AdapterYouTubeConfig {
        AdapterYouTubeConfig {
            base_url: self.youtube.base_url.clone(),
            transcript_base_url: self.youtube.transcript_base_url.clone(),
            transcript_language: self.youtube.transcript_language.clone(),
            timeout_secs: self.youtube.timeout_secs,
        }
    }

    pub fn llm_adapter_config(&self) -> AdapterLlmConfig {
        AdapterLlmConfig {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_output_tokens: self.llm.max_output_tokens,
            timeout_secs: self.llm.timeout_secs,
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::from_max_videos(self.cache.max_videos)
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# eightify configuration
# Every key can be overridden with EIGHTIFY__SECTION__KEY, e.g. EIGHTIFY__LLM__MODEL

[general]
log_level = "info"
# Characters of each prompt shown in debug logs
log_prompt_length = 100

[server]
bind_addr = "127.0.0.1"
port = 8000

[youtube]
source = "api"  # api, stub
api_key_env = "YOUTUBE_API_KEY"
base_url = "https://www.googleapis.com/youtube/v3"
transcript_base_url = "https://www.youtube.com/api"
transcript_language = "en"
timeout_secs = 30

[llm]
provider = "auto"  # auto (from model name), openai, anthropic, stub
model = "gpt-4o"   # claude-* models are sent to Anthropic
temperature = 0.2
max_output_tokens = 4096
timeout_secs = 120

[llm.openai]
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"

[llm.anthropic]
api_key_env = "ANTHROPIC_API_KEY"
base_url = "https://api.anthropic.com"

[insights]
max_points = 5
max_topics = 5
# Fewer comments than this skips the analysis
min_comments = 10
max_comments = 100
# 0 sends the whole transcript
max_transcript_length = 20000

[cache]
# 0 keeps every video until restart
max_videos = 0
"#
        .to_string()
    }
}
