//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{CachedVideo, VideoComment, VideoDetails, VideoId, VideoTranscript};
use crate::prompt::InferenceRequest;

/// Error type for video platform operations
#[derive(Debug, Error)]
pub enum VideoSourceError {
    #[error("Video not found: {0}")]
    NotFound(String),
    #[error("Transcript unavailable: {0}")]
    Unavailable(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
}

/// Port for the video hosting platform
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch title and description
    async fn get_video_details(&self, id: &VideoId) -> Result<VideoDetails, VideoSourceError>;

    /// Fetch the caption track. `Unavailable` is an expected outcome.
    async fn get_video_transcript(&self, id: &VideoId)
    -> Result<VideoTranscript, VideoSourceError>;

    /// Fetch up to `max_results` top-level comments ordered by relevance.
    /// Disabled or missing comments yield an empty vector.
    async fn get_video_comments(
        &self,
        id: &VideoId,
        max_results: usize,
    ) -> Result<Vec<VideoComment>, VideoSourceError>;
}

/// Error type for LLM gateway operations
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout")]
    Timeout,
    #[error("Provider refused or filtered the content: {0}")]
    Content(String),
    #[error("Empty response")]
    Empty,
}

/// Port for a large-language-model provider
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send the prompts and schema, returning the raw JSON text of the answer
    async fn infer(&self, request: &InferenceRequest) -> Result<String, GenerationError>;

    /// Provider name for logs (e.g., "openai", "anthropic")
    fn provider(&self) -> &'static str;
}

#[async_trait]
impl<T: LlmGateway + ?Sized> LlmGateway for Arc<T> {
    async fn infer(&self, request: &InferenceRequest) -> Result<String, GenerationError> {
        (**self).infer(request).await
    }

    fn provider(&self) -> &'static str {
        (**self).provider()
    }
}

#[async_trait]
impl<T: LlmGateway + ?Sized> LlmGateway for Box<T> {
    async fn infer(&self, request: &InferenceRequest) -> Result<String, GenerationError> {
        (**self).infer(request).await
    }

    fn provider(&self) -> &'static str {
        (**self).provider()
    }
}

macro_rules! forward_video_source {
    ($wrapper:ident) => {
        #[async_trait]
        impl<T: VideoSource + ?Sized> VideoSource for $wrapper<T> {
            async fn get_video_details(
                &self,
                id: &VideoId,
            ) -> Result<VideoDetails, VideoSourceError> {
                (**self).get_video_details(id).await
            }

            async fn get_video_transcript(
                &self,
                id: &VideoId,
            ) -> Result<VideoTranscript, VideoSourceError> {
                (**self).get_video_transcript(id).await
            }

            async fn get_video_comments(
                &self,
                id: &VideoId,
                max_results: usize,
            ) -> Result<Vec<VideoComment>, VideoSourceError> {
                (**self).get_video_comments(id, max_results).await
            }
        }
    };
}

forward_video_source!(Box);
forward_video_source!(Arc);

/// Error type for cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache lock poisoned: {0}")]
    Poisoned(String),
}

/// Port for the process-lifetime video cache
#[async_trait]
pub trait VideoCache: Send + Sync {
    /// Get the cached entry for a video, if any
    async fn get(&self, id: &VideoId) -> Result<Option<CachedVideo>, CacheError>;

    /// Insert or overwrite the entry for `entry.video_id`
    async fn put(&self, entry: CachedVideo) -> Result<(), CacheError>;

    /// Number of cached videos
    async fn len(&self) -> Result<usize, CacheError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
