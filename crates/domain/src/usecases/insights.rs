//! Insight use case - orchestrates fetching, prompting, inference and parsing

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    model::{
        CachedVideo, CommentAnalysisOutcome, VideoDetails, VideoId, VideoStage, VideoSummary,
        VideoTranscript,
    },
    ports::{
        CacheError, Clock, GenerationError, LlmGateway, SystemClock, VideoCache, VideoSource,
        VideoSourceError,
    },
    prompt::{self, InferenceRequest},
    response,
    usecases::render::render_summary_markdown,
};

/// Configuration for the insight service
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Maximum key points requested from the model
    pub max_points: usize,
    /// Maximum comment topics requested from the model
    pub max_topics: usize,
    /// Below this many comments, analysis is skipped
    pub min_comments: usize,
    /// Comments fetched per analysis
    pub max_comments: usize,
    /// Transcript prefix sent to the model (None = whole transcript)
    pub max_transcript_length: Option<usize>,
    /// Characters of each prompt shown in debug logs
    pub log_prompt_length: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            max_points: 5,
            max_topics: 5,
            min_comments: 10,
            max_comments: 100,
            max_transcript_length: None,
            log_prompt_length: 100,
        }
    }
}

/// User-facing failure of an insight operation
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    /// The video platform could not be reached or refused the request
    #[error("Video platform request failed: {0}")]
    Upstream(String),
    #[error("LLM failed to generate a response: {0}")]
    GenerationFailure(String),
    #[error("LLM response had an unexpected shape: {0}")]
    ParseFailure(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<VideoSourceError> for InsightError {
    fn from(err: VideoSourceError) -> Self {
        match err {
            VideoSourceError::NotFound(msg) => InsightError::NotFound(msg),
            VideoSourceError::Unavailable(msg) => InsightError::Unavailable(msg),
            other @ (VideoSourceError::Auth(_)
            | VideoSourceError::Network(_)
            | VideoSourceError::Api(_)) => InsightError::Upstream(other.to_string()),
        }
    }
}

impl From<GenerationError> for InsightError {
    fn from(err: GenerationError) -> Self {
        InsightError::GenerationFailure(err.to_string())
    }
}

/// Summarizes videos and analyzes their comments.
///
/// Details, transcripts and the latest summary are kept in the injected
/// cache; comments are fetched fresh on every analysis.
pub struct InsightService<V, L, C> {
    source: V,
    llm: L,
    cache: C,
    clock: Arc<dyn Clock>,
    config: InsightConfig,
}

impl<V, L, C> InsightService<V, L, C>
where
    V: VideoSource,
    L: LlmGateway,
    C: VideoCache,
{
    pub fn new(source: V, llm: L, cache: C, config: InsightConfig) -> Self {
        Self {
            source,
            llm,
            cache,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the clock used for cache timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Furthest stage reached by a video
    pub async fn stage(&self, id: &VideoId) -> Result<VideoStage, InsightError> {
        Ok(self
            .cache
            .get(id)
            .await?
            .map(|entry| entry.stage)
            .unwrap_or_default())
    }

    /// Summarize a video into key points
    pub async fn summarize(&self, id: &VideoId) -> Result<VideoSummary, InsightError> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, video_id = %id, "Summarizing video");

        let mut entry = self.load_entry(id).await?;
        let details = self.ensure_details(&mut entry).await?;
        let transcript = self.ensure_transcript(&mut entry).await?;

        let request = prompt::build_summary_prompt(
            &details.title,
            &details.description,
            &transcript.text,
            self.config.max_points,
            self.config.max_transcript_length,
        );

        let raw = self.generate(&request, "summarize").await?;
        let points = response::parse_summary(&raw).map_err(|e| {
            tracing::error!(%run_id, error = %e, "Failed to parse summary");
            InsightError::ParseFailure(e.to_string())
        })?;
        let markdown = render_summary_markdown(&points);

        entry.summary = Some(markdown.clone());
        entry.advance(VideoStage::Summarized, self.clock.now());
        self.cache.put(entry).await?;

        tracing::info!(%run_id, points = points.len(), "Summary ready");

        Ok(VideoSummary { points, markdown })
    }

    /// Cluster a video's comments into topics, optionally steered by a
    /// free-text insight request
    pub async fn analyze_comments(
        &self,
        id: &VideoId,
        insight_request: Option<&str>,
    ) -> Result<CommentAnalysisOutcome, InsightError> {
        let run_id = Uuid::new_v4();
        tracing::info!(
            %run_id,
            video_id = %id,
            has_insight_request = insight_request.is_some(),
            "Analyzing comments"
        );

        let mut entry = self.load_entry(id).await?;
        let details = self.ensure_details(&mut entry).await?;

        let comments = self
            .source
            .get_video_comments(id, self.config.max_comments)
            .await?;

        if comments.len() < self.config.min_comments {
            tracing::info!(
                %run_id,
                found = comments.len(),
                required = self.config.min_comments,
                "Not enough comments to analyze"
            );
            return Ok(CommentAnalysisOutcome::NotEnoughComments {
                found: comments.len(),
                required: self.config.min_comments,
            });
        }

        let request = prompt::build_comment_analysis_prompt(
            &details,
            &comments,
            entry.summary.as_deref(),
            insight_request,
            self.config.max_topics,
        );

        let raw = self.generate(&request, "analyze_comments").await?;
        let analysis = response::parse_comment_analysis(&raw, &comments).map_err(|e| {
            tracing::error!(%run_id, error = %e, "Failed to parse comment analysis");
            InsightError::ParseFailure(e.to_string())
        })?;

        entry.advance(VideoStage::CommentsAnalyzed, self.clock.now());
        self.cache.put(entry).await?;

        tracing::info!(
            %run_id,
            comments = analysis.comments.len(),
            topics = analysis.topics.len(),
            "Comment analysis ready"
        );

        Ok(CommentAnalysisOutcome::Analyzed(analysis))
    }

    async fn load_entry(&self, id: &VideoId) -> Result<CachedVideo, InsightError> {
        Ok(match self.cache.get(id).await? {
            Some(entry) => entry,
            None => CachedVideo::new(id.clone(), self.clock.now()),
        })
    }

    async fn ensure_details(&self, entry: &mut CachedVideo) -> Result<VideoDetails, InsightError> {
        if let Some(details) = &entry.details {
            tracing::debug!(video_id = %entry.video_id, "Video details cache hit");
            return Ok(details.clone());
        }

        let details = self.source.get_video_details(&entry.video_id).await?;
        entry.details = Some(details.clone());
        entry.advance(VideoStage::DetailsFetched, self.clock.now());
        self.cache.put(entry.clone()).await?;

        Ok(details)
    }

    async fn ensure_transcript(
        &self,
        entry: &mut CachedVideo,
    ) -> Result<VideoTranscript, InsightError> {
        if let Some(transcript) = &entry.transcript {
            tracing::debug!(video_id = %entry.video_id, "Transcript cache hit");
            return Ok(transcript.clone());
        }

        let transcript = self.source.get_video_transcript(&entry.video_id).await?;
        entry.transcript = Some(transcript.clone());
        entry.advance(VideoStage::TranscriptFetched, self.clock.now());
        self.cache.put(entry.clone()).await?;

        Ok(transcript)
    }

    async fn generate(
        &self,
        request: &InferenceRequest,
        prompt_name: &str,
    ) -> Result<String, InsightError> {
        tracing::debug!(
            prompt_name,
            provider = self.llm.provider(),
            size = request.user_prompt.len(),
            preview = %prompt::prompt_preview(&request.user_prompt, self.config.log_prompt_length),
            "Sending prompt"
        );

        let raw = self.llm.infer(request).await.map_err(|e| {
            tracing::error!(prompt_name, error = %e, "LLM call failed");
            InsightError::from(e)
        })?;

        tracing::debug!(
            prompt_name,
            size = raw.len(),
            preview = %prompt::prompt_preview(&raw, self.config.log_prompt_length),
            "LLM response"
        );

        Ok(raw)
    }
}
