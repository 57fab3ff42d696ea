//! Domain models and value objects

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

static VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(https?://)?(((m|www)\.)?(youtube(-nocookie)?|youtube\.googleapis)\.com.*(v/|v=|vi=|vi/|e/|embed/|shorts/|user/.*/u/\d+/)|youtu\.be/)(?P<id>[_0-9a-z-]+)",
    )
    .expect("video URL pattern is valid")
});

static BARE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video ID pattern is valid"));

/// Returned when a string is neither a YouTube video ID nor a URL containing one
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("not a YouTube video ID or URL: {0}")]
pub struct InvalidVideoId(pub String);

/// A YouTube video ID (always 11 characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Accept a bare ID or any of the usual watch/share/embed URL shapes
    pub fn parse(input: &str) -> Result<Self, InvalidVideoId> {
        let trimmed = input.trim();

        if BARE_ID_RE.is_match(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }

        VIDEO_URL_RE
            .captures(trimmed)
            .and_then(|caps| caps.name("id"))
            .map(|m| m.as_str())
            .filter(|id| BARE_ID_RE.is_match(id))
            .map(|id| Self(id.to_string()))
            .ok_or_else(|| InvalidVideoId(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Title and description of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub title: String,
    pub description: String,
}

/// Caption track of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTranscript {
    /// All fragments joined with single spaces
    pub text: String,
    /// Caption fragments in playback order
    pub points: Vec<String>,
}

impl VideoTranscript {
    pub fn from_points(points: Vec<String>) -> Self {
        let text = points.join(" ");
        Self { text, points }
    }
}

/// A top-level comment. The text is the platform's display text and may
/// contain HTML markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoComment {
    pub text: String,
}

impl VideoComment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One key point of a video summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryPoint {
    /// Relevant emoji
    pub emoji: String,
    /// Bold title, at most five words
    pub title: String,
    /// Two or three sentences combining main idea, implications and examples
    pub content: String,
    /// Brief, impactful quote from the video
    pub quote: String,
    /// Approximate timestamp in MM:SS format
    pub timestamp: String,
}

/// Summary of a video: the parsed points and their Markdown rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub points: Vec<SummaryPoint>,
    pub markdown: String,
}

/// An LLM-derived cluster of comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentTopic {
    pub name: String,
    pub description: String,
    /// Offsets into `CommentAnalysis::comments`, always in range
    pub comment_indices: Vec<usize>,
}

/// Something the viewer might want to look into next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FollowUpTopic {
    pub topic: String,
    pub reason: String,
}

/// Result of one comment analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAnalysis {
    /// The comments sent to the model, in prompt order
    pub comments: Vec<VideoComment>,
    pub topics: Vec<CommentTopic>,
    pub overall_analysis: String,
    #[serde(default)]
    pub follow_up_topics: Vec<FollowUpTopic>,
}

impl CommentAnalysis {
    /// Comments assigned to the topic at `topic_index`
    pub fn comments_for_topic(&self, topic_index: usize) -> Vec<&VideoComment> {
        self.topics
            .get(topic_index)
            .map(|topic| {
                topic
                    .comment_indices
                    .iter()
                    .filter_map(|&i| self.comments.get(i))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Outcome of a comment analysis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentAnalysisOutcome {
    Analyzed(CommentAnalysis),
    /// Too few comments to be worth analyzing; the LLM was not called
    NotEnoughComments { found: usize, required: usize },
}

/// Furthest pipeline stage a video has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStage {
    #[default]
    Unfetched,
    DetailsFetched,
    TranscriptFetched,
    Summarized,
    CommentsAnalyzed,
}

/// Everything cached for one video ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedVideo {
    pub video_id: VideoId,
    pub details: Option<VideoDetails>,
    pub transcript: Option<VideoTranscript>,
    /// Markdown of the most recent summary
    pub summary: Option<String>,
    pub stage: VideoStage,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CachedVideo {
    pub fn new(video_id: VideoId, now: OffsetDateTime) -> Self {
        Self {
            video_id,
            details: None,
            transcript: None,
            summary: None,
            stage: VideoStage::Unfetched,
            updated_at: now,
        }
    }

    /// Move forward to `stage`; never moves backwards
    pub fn advance(&mut self, stage: VideoStage, now: OffsetDateTime) {
        if stage > self.stage {
            self.stage = stage;
        }
        self.updated_at = now;
    }
}
