//! Stub gateway for testing and offline mode

use async_trait::async_trait;
use eightify_domain::{GenerationError, InferenceRequest, LlmGateway};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Stub gateway that returns configurable responses
pub struct StubGateway {
    response: Option<String>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl StubGateway {
    /// Create a stub that answers every function with a small canned payload
    pub fn canned() -> Self {
        Self {
            response: None,
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a stub that returns a specific raw response
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a stub that always fails with an API error
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            response: None,
            error: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `infer` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn canned_for(function: &str) -> String {
        match function {
            "analyze_and_cluster_comments" => json!({
                "topics": [{
                    "name": "Stub topic",
                    "description": "Offline placeholder topic",
                    "comment_indices": [0]
                }],
                "overall_analysis": "Stub analysis generated offline.",
                "follow_up_topics": []
            }),
            _ => json!({
                "summary": [{
                    "emoji": "🧪",
                    "title": "Stub Summary",
                    "content": "This summary was generated offline. No model was called.",
                    "quote": "stub",
                    "timestamp": "00:00"
                }]
            }),
        }
        .to_string()
    }
}

impl Default for StubGateway {
    fn default() -> Self {
        Self::canned()
    }
}

#[async_trait]
impl LlmGateway for StubGateway {
    async fn infer(&self, request: &InferenceRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(ref message) = self.error {
            return Err(GenerationError::Api(message.clone()));
        }

        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }

        Ok(Self::canned_for(request.schema.name))
    }

    fn provider(&self) -> &'static str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eightify_domain::prompt::build_summary_prompt;
    use eightify_domain::response::parse_summary;

    fn sample_request() -> InferenceRequest {
        build_summary_prompt("Title", "Description", "transcript", 5, None)
    }

    #[tokio::test]
    async fn test_canned_summary_parses() {
        let gateway = StubGateway::canned();
        let raw = gateway.infer(&sample_request()).await.unwrap();

        let points = parse_summary(&raw).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_configured_response() {
        let gateway = StubGateway::with_response("not json");
        let raw = gateway.infer(&sample_request()).await.unwrap();

        assert_eq!(raw, "not json");
    }

    #[tokio::test]
    async fn test_error_stub() {
        let gateway = StubGateway::with_error("boom");
        let result = gateway.infer(&sample_request()).await;

        assert!(matches!(result, Err(GenerationError::Api(_))));
        assert_eq!(gateway.calls(), 1);
    }
}
