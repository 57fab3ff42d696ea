//! Command implementations and the wiring they share

pub mod comments;
pub mod config;
pub mod doctor;
pub mod serve;
pub mod summarize;

use anyhow::{Context, Result, bail};
use eightify_adapters::{
    cache::InMemoryVideoCache,
    llm::{AnthropicGateway, OpenAiGateway, ProviderKind, StubGateway},
    youtube::{StubVideoSource, YouTubeVideoSource},
};
use eightify_domain::usecases::InsightService;
use eightify_domain::{LlmGateway, VideoId, VideoSource};
use secrecy::SecretString;
use std::sync::Arc;

use crate::config::AppConfig;

/// The service as wired by the binary
pub(crate) type AppService =
    InsightService<Arc<dyn VideoSource>, Arc<dyn LlmGateway>, InMemoryVideoCache>;

pub(crate) fn build_service(config: &AppConfig) -> Result<AppService> {
    let source = build_video_source(config)?;
    let llm = build_llm_gateway(config)?;
    let cache = InMemoryVideoCache::with_policy(config.cache_policy());

    Ok(InsightService::new(
        source,
        llm,
        cache,
        config.insight_config(),
    ))
}

pub(crate) fn build_video_source(config: &AppConfig) -> Result<Arc<dyn VideoSource>> {
    match config.youtube.source.as_str() {
        "api" => {
            let api_key = load_api_key(&config.youtube.api_key_env, "youtube")?;
            let source = YouTubeVideoSource::new(api_key, config.youtube_adapter_config())
                .context("Failed to configure YouTube client")?;
            Ok(Arc::new(source))
        }
        "stub" => Ok(Arc::new(StubVideoSource::sample())),
        other => bail!("Unknown video source: {}", other),
    }
}

/// Resolve `llm.provider`, where `auto` decides from the model name
pub(crate) fn resolve_provider(config: &AppConfig) -> Result<&'static str> {
    match config.llm.provider.as_str() {
        "auto" => Ok(ProviderKind::from_model(&config.llm.model).as_str()),
        "openai" => Ok("openai"),
        "anthropic" => Ok("anthropic"),
        "stub" => Ok("stub"),
        other => bail!("Unknown LLM provider: {}", other),
    }
}

pub(crate) fn build_llm_gateway(config: &AppConfig) -> Result<Arc<dyn LlmGateway>> {
    let llm_config = config.llm_adapter_config();

    match resolve_provider(config)? {
        "openai" => {
            let api_key = load_api_key(&config.llm.openai.api_key_env, "openai")?;
            let gateway = OpenAiGateway::with_base_url(
                api_key,
                config.llm.openai.base_url.clone(),
                llm_config,
            )
            .context("Failed to configure OpenAI client")?;
            Ok(Arc::new(gateway))
        }
        "anthropic" => {
            let api_key = load_api_key(&config.llm.anthropic.api_key_env, "anthropic")?;
            let gateway = AnthropicGateway::with_base_url(
                api_key,
                config.llm.anthropic.base_url.clone(),
                llm_config,
            )
            .context("Failed to configure Anthropic client")?;
            Ok(Arc::new(gateway))
        }
        _ => Ok(Arc::new(StubGateway::canned())),
    }
}

pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No API key env var configured for provider {}", provider);
    }

    let key = std::env::var(env_var).with_context(|| {
        format!(
            "Missing API key env var {} for provider {}",
            env_var, provider
        )
    })?;

    if key.trim().is_empty() {
        bail!(
            "API key env var {} is empty for provider {}",
            env_var,
            provider
        );
    }

    Ok(SecretString::new(key.into()))
}

pub(crate) fn parse_video_id(input: &str) -> Result<VideoId> {
    VideoId::parse(input).with_context(|| format!("Not a YouTube video URL or ID: {}", input))
}
