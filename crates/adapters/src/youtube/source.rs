//! YouTube Data API v3 and timed-text transcript adapter

use async_trait::async_trait;
use eightify_domain::{
    VideoComment, VideoDetails, VideoId, VideoSource, VideoSourceError, VideoTranscript,
};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::YouTubeConfig;

/// The Data API caps `maxResults` for comment threads at 100
const MAX_PAGE_SIZE: usize = 100;

/// Timed-text `kind` of speech-recognition captions
const AUTO_CAPTIONS_KIND: &str = "asr";

/// Video source backed by the YouTube Data API
pub struct YouTubeVideoSource {
    client: Client,
    api_key: SecretString,
    config: YouTubeConfig,
}

impl YouTubeVideoSource {
    pub fn new(api_key: SecretString, config: YouTubeConfig) -> Result<Self, VideoSourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VideoSourceError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    async fn get_data_api(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Response, VideoSourceError> {
        let url = format!("{}/{}", self.config.base_url, endpoint);

        self.client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| VideoSourceError::Network(e.to_string()))
    }

    async fn fetch_comment_page(
        &self,
        id: &VideoId,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<Option<CommentThreadsResponse>, VideoSourceError> {
        let page_size = page_size.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("videoId", id.as_str()),
            ("maxResults", page_size.as_str()),
            ("order", "relevance"),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.get_data_api("commentThreads", &query).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::FORBIDDEN && error_reason(&body).as_deref() == Some("commentsDisabled")
            {
                tracing::info!(video_id = %id, "Comments are disabled");
                return Ok(None);
            }
            return Err(classify_error(status, &body, id));
        }

        let page: CommentThreadsResponse = response
            .json()
            .await
            .map_err(|e| VideoSourceError::Api(format!("Invalid comment threads response: {}", e)))?;

        Ok(Some(page))
    }

    /// Caption lines of one timed-text track. A missing track is empty.
    async fn fetch_caption_track(
        &self,
        id: &VideoId,
        kind: Option<&str>,
    ) -> Result<Vec<String>, VideoSourceError> {
        let url = format!("{}/timedtext", self.config.transcript_base_url);
        let mut query = vec![
            ("v", id.as_str()),
            ("lang", self.config.transcript_language.as_str()),
            ("fmt", "json3"),
        ];
        if let Some(kind) = kind {
            query.push(("kind", kind));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| VideoSourceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VideoSourceError::Unavailable(format!(
                "{}: timed text returned {}",
                id,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VideoSourceError::Network(e.to_string()))?;

        // No such track comes back as 200 with an empty body
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let timed_text: TimedTextResponse = serde_json::from_str(&body).map_err(|e| {
            VideoSourceError::Unavailable(format!("{}: unreadable captions: {}", id, e))
        })?;

        Ok(timed_text
            .events
            .into_iter()
            .map(|event| {
                event
                    .segs
                    .into_iter()
                    .map(|seg| seg.utf8)
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .collect())
    }
}

/// Map a non-success Data API status to a source error
fn classify_error(status: StatusCode, body: &str, id: &VideoId) -> VideoSourceError {
    let reason = error_reason(body);
    match (status, reason.as_deref()) {
        (StatusCode::NOT_FOUND, _) | (_, Some("videoNotFound")) => {
            VideoSourceError::NotFound(id.to_string())
        }
        (StatusCode::UNAUTHORIZED, _)
        | (StatusCode::FORBIDDEN, _)
        | (_, Some("keyInvalid" | "forbidden")) => {
            VideoSourceError::Auth(format!("YouTube API returned {}: {}", status, body))
        }
        _ => VideoSourceError::Api(format!("YouTube API returned {}: {}", status, body)),
    }
}

/// First `error.errors[].reason` of a Data API error body
fn error_reason(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.errors.into_iter().next().map(|e| e.reason)
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    errors: Vec<ApiErrorReason>,
}

#[derive(Deserialize)]
struct ApiErrorReason {
    reason: String,
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Deserialize)]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
}

#[derive(Deserialize)]
struct TimedTextResponse {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Deserialize)]
struct TimedTextEvent {
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

#[async_trait]
impl VideoSource for YouTubeVideoSource {
    async fn get_video_details(&self, id: &VideoId) -> Result<VideoDetails, VideoSourceError> {
        tracing::debug!(video_id = %id, "Fetching video details");

        let response = self
            .get_data_api("videos", &[("part", "snippet"), ("id", id.as_str())])
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body, id));
        }

        let videos: VideosResponse = response
            .json()
            .await
            .map_err(|e| VideoSourceError::Api(format!("Invalid videos response: {}", e)))?;

        let item = videos
            .items
            .into_iter()
            .next()
            .ok_or_else(|| VideoSourceError::NotFound(id.to_string()))?;

        Ok(VideoDetails {
            title: item.snippet.title,
            description: item.snippet.description,
        })
    }

    async fn get_video_transcript(
        &self,
        id: &VideoId,
    ) -> Result<VideoTranscript, VideoSourceError> {
        tracing::debug!(video_id = %id, language = %self.config.transcript_language, "Fetching transcript");

        let mut points = self.fetch_caption_track(id, None).await?;
        if points.is_empty() {
            tracing::debug!(video_id = %id, "No uploaded captions, trying auto-generated track");
            points = self.fetch_caption_track(id, Some(AUTO_CAPTIONS_KIND)).await?;
        }

        if points.is_empty() {
            return Err(VideoSourceError::Unavailable(format!(
                "{}: no captions in '{}'",
                id, self.config.transcript_language
            )));
        }

        Ok(VideoTranscript::from_points(points))
    }

    async fn get_video_comments(
        &self,
        id: &VideoId,
        max_results: usize,
    ) -> Result<Vec<VideoComment>, VideoSourceError> {
        tracing::debug!(video_id = %id, max_results, "Fetching comments");

        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < max_results {
            let page_size = (max_results - comments.len()).min(MAX_PAGE_SIZE);
            let Some(page) = self
                .fetch_comment_page(id, page_size, page_token.as_deref())
                .await?
            else {
                break;
            };

            if page.items.is_empty() {
                break;
            }

            comments.extend(page.items.into_iter().map(|thread| {
                VideoComment::new(thread.snippet.top_level_comment.snippet.text_display)
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        comments.truncate(max_results);
        tracing::debug!(video_id = %id, count = comments.len(), "Fetched comments");

        Ok(comments)
    }
}
