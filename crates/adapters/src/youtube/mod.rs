//! YouTube video source adapters

mod source;

pub use source::YouTubeVideoSource;

use async_trait::async_trait;
use eightify_domain::{
    VideoComment, VideoDetails, VideoId, VideoSource, VideoSourceError, VideoTranscript,
};
use serde::{Deserialize, Serialize};

/// Endpoints and request settings for the YouTube adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// Data API v3 base URL
    pub base_url: String,
    /// Base URL hosting the `timedtext` endpoint
    pub transcript_base_url: String,
    /// Caption language code
    pub transcript_language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            transcript_base_url: "https://www.youtube.com/api".to_string(),
            transcript_language: "en".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Stub video source serving canned data
#[derive(Default)]
pub struct StubVideoSource {
    details: Option<VideoDetails>,
    transcript: Option<VideoTranscript>,
    comments: Vec<VideoComment>,
    auth_error: Option<String>,
}

impl StubVideoSource {
    /// Create a stub where every video is missing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_details(mut self, details: VideoDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_transcript(mut self, transcript: VideoTranscript) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn with_comments(mut self, comments: Vec<VideoComment>) -> Self {
        self.comments = comments;
        self
    }

    /// Reject every call as if the API key were refused
    pub fn with_auth_error(mut self, message: impl Into<String>) -> Self {
        self.auth_error = Some(message.into());
        self
    }

    fn check_auth(&self) -> Result<(), VideoSourceError> {
        match &self.auth_error {
            Some(message) => Err(VideoSourceError::Auth(message.clone())),
            None => Ok(()),
        }
    }

    /// A small fixture resembling a real music video
    pub fn sample() -> Self {
        Self::empty()
            .with_details(VideoDetails {
                title: "Rick Astley - Never Gonna Give You Up (Official Music Video)".to_string(),
                description: "The official video for “Never Gonna Give You Up” by Rick Astley."
                    .to_string(),
            })
            .with_transcript(VideoTranscript::from_points(vec![
                "We're no strangers to love".to_string(),
                "You know the rules and so do I".to_string(),
                "Never gonna give you up".to_string(),
                "Never gonna let you down".to_string(),
            ]))
            .with_comments(
                [
                    "Who else got rickrolled in 2024?",
                    "This song never gets old",
                    "I came here on purpose and I'm not ashamed",
                    "The dance moves are legendary",
                    "We played this at my wedding",
                    "Rick's voice is so deep for his age at the time",
                    "Still better than most modern pop",
                    "I got rickrolled by a QR code",
                    "The most famous meme of the internet",
                    "Rick never gave us up after all these years",
                    "Classic 80s production",
                    "This is the best prank song ever",
                ]
                .into_iter()
                .map(VideoComment::new)
                .collect(),
            )
    }
}

#[async_trait]
impl VideoSource for StubVideoSource {
    async fn get_video_details(&self, id: &VideoId) -> Result<VideoDetails, VideoSourceError> {
        self.check_auth()?;
        self.details
            .clone()
            .ok_or_else(|| VideoSourceError::NotFound(id.to_string()))
    }

    async fn get_video_transcript(
        &self,
        id: &VideoId,
    ) -> Result<VideoTranscript, VideoSourceError> {
        self.check_auth()?;
        self.transcript
            .clone()
            .ok_or_else(|| VideoSourceError::Unavailable(id.to_string()))
    }

    async fn get_video_comments(
        &self,
        _id: &VideoId,
        max_results: usize,
    ) -> Result<Vec<VideoComment>, VideoSourceError> {
        self.check_auth()?;
        Ok(self.comments.iter().take(max_results).cloned().collect())
    }
}
