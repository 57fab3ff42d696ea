//! HTTP API over the insight service

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use eightify_domain::usecases::InsightError;
use eightify_domain::{CommentAnalysisOutcome, SummaryPoint, VideoId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::commands::AppService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AppService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/summarize", post(summarize))
        .route("/analyze_comments", post(analyze_comments))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_methods(Any)
                .allow_origin(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentAnalysisRequest {
    pub video_id: String,
    #[serde(default)]
    pub insight_request: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub points: Vec<SummaryPoint>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

/// Failure of an API call, rendered as `{error, detail}`
#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(JsonRejection),
    InvalidVideoId(String),
    Insight(InsightError),
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        ApiError::Insight(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            ApiError::InvalidRequest(rejection) => {
                (rejection.status(), "invalid_request", rejection.body_text())
            }
            ApiError::InvalidVideoId(detail) => {
                (StatusCode::BAD_REQUEST, "invalid_video_id", detail)
            }
            ApiError::Insight(err) => {
                let detail = err.to_string();
                match err {
                    InsightError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", detail),
                    InsightError::Unavailable(_) => {
                        (StatusCode::NOT_FOUND, "unavailable", detail)
                    }
                    InsightError::Upstream(_) => {
                        (StatusCode::BAD_GATEWAY, "upstream_failure", detail)
                    }
                    InsightError::GenerationFailure(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "generation_failure",
                        detail,
                    ),
                    InsightError::ParseFailure(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "parse_failure",
                        detail,
                    ),
                    InsightError::Cache(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "cache_failure", detail)
                    }
                }
            }
        };

        if status.is_server_error() {
            tracing::error!(%status, error, %detail, "Request failed");
        } else {
            tracing::info!(%status, error, %detail, "Request rejected");
        }

        (status, Json(ErrorBody { error, detail })).into_response()
    }
}

fn parse_video_id(input: &str) -> Result<VideoId, ApiError> {
    VideoId::parse(input).map_err(|e| ApiError::InvalidVideoId(e.to_string()))
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the eightify API, a tool for generating insights from YouTube videos."
    }))
}

async fn health() -> &'static str {
    "ok"
}

async fn summarize(
    State(state): State<AppState>,
    request: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(request) = request?;
    let video_id = parse_video_id(&request.video_id)?;
    let summary = state.service.summarize(&video_id).await?;

    Ok(Json(SummarizeResponse {
        summary: summary.markdown,
        points: summary.points,
    }))
}

async fn analyze_comments(
    State(state): State<AppState>,
    request: Result<Json<CommentAnalysisRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request?;
    let video_id = parse_video_id(&request.video_id)?;
    let insight_request = request
        .insight_request
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match state
        .service
        .analyze_comments(&video_id, insight_request)
        .await?
    {
        CommentAnalysisOutcome::Analyzed(analysis) => Ok(Json(analysis).into_response()),
        CommentAnalysisOutcome::NotEnoughComments { found, required } => {
            tracing::info!(video_id = %video_id, found, required, "Not enough comments");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use eightify_adapters::cache::InMemoryVideoCache;
    use eightify_adapters::llm::StubGateway;
    use eightify_adapters::youtube::StubVideoSource;
    use eightify_domain::usecases::{InsightConfig, InsightService};
    use eightify_domain::{LlmGateway, VideoSource};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app_with(source: StubVideoSource, llm: StubGateway) -> Router {
        let source: Arc<dyn VideoSource> = Arc::new(source);
        let llm: Arc<dyn LlmGateway> = Arc::new(llm);
        let service = InsightService::new(
            source,
            llm,
            InMemoryVideoCache::new(),
            InsightConfig::default(),
        );
        router(AppState {
            service: Arc::new(service),
        })
    }

    fn app() -> Router {
        app_with(StubVideoSource::sample(), StubGateway::canned())
    }

    async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body bytes")
            .to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let router = app();

        let response = router
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_summarize_ok() {
        let router = app();

        let (status, body) = post_json(
            &router,
            "/summarize",
            serde_json::json!({ "video_id": "https://www.youtube.com/watch?v=dQw4w9WgXcQ" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert!(value["summary"].as_str().unwrap().starts_with("**Key Points**"));
        assert_eq!(value["points"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_summarize_invalid_id_is_400() {
        let router = app();

        let (status, body) = post_json(
            &router,
            "/summarize",
            serde_json::json!({ "video_id": "definitely not a video" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["error"], "invalid_video_id");
    }

    #[tokio::test]
    async fn test_summarize_missing_video_is_404() {
        let router = app_with(StubVideoSource::empty(), StubGateway::canned());

        let (status, body) = post_json(
            &router,
            "/summarize",
            serde_json::json!({ "video_id": "dQw4w9WgXcQ" }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["error"], "not_found");
    }

    #[tokio::test]
    async fn test_summarize_rejected_api_key_is_502() {
        let source = StubVideoSource::sample().with_auth_error("API key not valid");
        let router = app_with(source, StubGateway::canned());

        let (status, body) = post_json(
            &router,
            "/summarize",
            serde_json::json!({ "video_id": "dQw4w9WgXcQ" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["error"], "upstream_failure");
        assert!(value["detail"].as_str().unwrap().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_analyze_comments_rejected_api_key_is_502() {
        let source = StubVideoSource::sample().with_auth_error("API key not valid");
        let router = app_with(source, StubGateway::canned());

        let (status, _) = post_json(
            &router,
            "/analyze_comments",
            serde_json::json!({ "video_id": "dQw4w9WgXcQ" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_summarize_missing_field_is_json_error() {
        let router = app();

        let (status, body) =
            post_json(&router, "/summarize", serde_json::json!({ "url": "dQw4w9WgXcQ" })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["error"], "invalid_request");
        assert!(value["detail"].as_str().unwrap().contains("video_id"));
    }

    #[tokio::test]
    async fn test_analyze_comments_non_json_body_is_json_error() {
        let response = app()
            .oneshot(
                Request::post("/analyze_comments")
                    .header("content-type", "application/json")
                    .body(Body::from("video_id=dQw4w9WgXcQ"))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body bytes")
            .to_bytes();
        let value: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(value["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_summarize_malformed_llm_json_is_500() {
        let router = app_with(
            StubVideoSource::sample(),
            StubGateway::with_response("{\"summary\": [ {\"emoji\": "),
        );

        let (status, body) = post_json(
            &router,
            "/summarize",
            serde_json::json!({ "video_id": "dQw4w9WgXcQ" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["error"], "parse_failure");
    }

    #[tokio::test]
    async fn test_analyze_comments_ok() {
        let router = app();

        let (status, body) = post_json(
            &router,
            "/analyze_comments",
            serde_json::json!({
                "video_id": "dQw4w9WgXcQ",
                "insight_request": "What do people remember about this song?"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).expect("json");
        let comments = value["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 12);
        assert_eq!(value["topics"][0]["comment_indices"], serde_json::json!([0]));
        assert!(value["overall_analysis"].is_string());
        assert!(value["follow_up_topics"].is_array());
    }

    #[tokio::test]
    async fn test_analyze_comments_too_few_is_204() {
        let source = StubVideoSource::sample().with_comments(vec![]);
        let router = app_with(source, StubGateway::canned());

        let (status, body) = post_json(
            &router,
            "/analyze_comments",
            serde_json::json!({ "video_id": "dQw4w9WgXcQ" }),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_comments_llm_failure_is_500() {
        let router = app_with(StubVideoSource::sample(), StubGateway::with_error("down"));

        let (status, body) = post_json(
            &router,
            "/analyze_comments",
            serde_json::json!({ "video_id": "dQw4w9WgXcQ" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["error"], "generation_failure");
    }
}
