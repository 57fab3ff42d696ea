//! Anthropic Messages API adapter with a forced tool

use async_trait::async_trait;
use eightify_domain::{GenerationError, InferenceRequest, LlmGateway};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{LlmConfig, build_client, map_transport_error, status_error};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic gateway
pub struct AnthropicGateway {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: LlmConfig,
}

impl AnthropicGateway {
    pub fn with_base_url(
        api_key: SecretString,
        base_url: String,
        config: LlmConfig,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            api_key,
            base_url,
            config,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
    tools: Vec<Tool<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a serde_json::Value,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    r#type: &'static str,
    name: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[async_trait]
impl LlmGateway for AnthropicGateway {
    async fn infer(&self, request: &InferenceRequest) -> Result<String, GenerationError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_output_tokens,
            system: &request.system_prompt,
            messages: vec![Message {
                role: "user",
                content: &request.user_prompt,
            }],
            temperature: self.config.temperature,
            tools: vec![Tool {
                name: request.schema.name,
                description: request.schema.description,
                input_schema: &request.schema.parameters,
            }],
            tool_choice: ToolChoice {
                r#type: "tool",
                name: request.schema.name,
            },
        };

        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let api_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Api(format!("Invalid response body: {}", e)))?;

        if api_response.stop_reason.as_deref() == Some("refusal") {
            return Err(GenerationError::Content("model refused the request".to_string()));
        }

        let mut text = String::new();
        for block in api_response.content {
            match block {
                ContentBlock::ToolUse { input } => return Ok(input.to_string()),
                ContentBlock::Text { text: t } => text.push_str(&t),
                ContentBlock::Other => {}
            }
        }

        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }

        tracing::warn!(
            tool = request.schema.name,
            "Model answered without using the tool"
        );
        Ok(text)
    }

    fn provider(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eightify_domain::prompt::build_comment_analysis_prompt;
    use eightify_domain::{VideoComment, VideoDetails};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> InferenceRequest {
        let details = VideoDetails {
            title: "Rick Astley - Never Gonna Give You Up".to_string(),
            description: "The official video".to_string(),
        };
        let comments = vec![
            VideoComment::new("Got rickrolled again"),
            VideoComment::new("Timeless song"),
        ];
        build_comment_analysis_prompt(&details, &comments, None, None, 5)
    }

    fn gateway(server: &MockServer) -> AnthropicGateway {
        AnthropicGateway::with_base_url(
            SecretString::new("test-key".into()),
            server.uri(),
            LlmConfig {
                model: "claude-3-5-sonnet-20241022".to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_infer_returns_tool_input_as_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-5-sonnet-20241022",
                "tool_choice": { "type": "tool", "name": "analyze_and_cluster_comments" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "stop_reason": "tool_use",
                "content": [{
                    "type": "tool_use",
                    "id": "toolu_1",
                    "name": "analyze_and_cluster_comments",
                    "input": {
                        "topics": [{ "name": "Rickrolls", "description": "Pranks", "comment_indices": [0] }],
                        "overall_analysis": "Mostly nostalgia."
                    }
                }]
            })))
            .mount(&server)
            .await;

        let raw = gateway(&server).infer(&sample_request()).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["topics"][0]["name"], "Rickrolls");
        assert_eq!(value["overall_analysis"], "Mostly nostalgia.");
    }

    #[tokio::test]
    async fn test_infer_falls_back_to_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "stop_reason": "end_turn",
                "content": [{ "type": "text", "text": "{\"topics\": [], \"overall_analysis\": \"\"}" }]
            })))
            .mount(&server)
            .await;

        let raw = gateway(&server).infer(&sample_request()).await.unwrap();

        assert!(raw.contains("overall_analysis"));
    }

    #[tokio::test]
    async fn test_infer_empty_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "stop_reason": "end_turn",
                "content": []
            })))
            .mount(&server)
            .await;

        let result = gateway(&server).infer(&sample_request()).await;

        assert!(matches!(result, Err(GenerationError::Empty)));
    }

    #[tokio::test]
    async fn test_infer_forbidden_is_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let result = gateway(&server).infer(&sample_request()).await;

        assert!(matches!(result, Err(GenerationError::Auth(_))));
    }
}
