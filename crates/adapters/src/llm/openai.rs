//! OpenAI Chat Completions adapter with forced function calling

use async_trait::async_trait;
use eightify_domain::{GenerationError, InferenceRequest, LlmGateway, ResponseSchema};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{LlmConfig, build_client, map_transport_error, status_error};

/// OpenAI gateway using the Chat Completions API
pub struct OpenAiGateway {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: LlmConfig,
}

impl OpenAiGateway {
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
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    tools: Vec<Tool<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct Tool<'a> {
    r#type: &'static str,
    function: FunctionDef<'a>,
}

#[derive(Serialize)]
struct FunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    r#type: &'static str,
    function: FunctionName<'a>,
}

#[derive(Serialize)]
struct FunctionName<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    arguments: String,
}

fn tool_for(schema: &ResponseSchema) -> Tool<'_> {
    Tool {
        r#type: "function",
        function: FunctionDef {
            name: schema.name,
            description: schema.description,
            parameters: &schema.parameters,
        },
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn infer(&self, request: &InferenceRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_output_tokens,
            tools: vec![tool_for(&request.schema)],
            tool_choice: ToolChoice {
                r#type: "function",
                function: FunctionName {
                    name: request.schema.name,
                },
            },
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Api(format!("Invalid response body: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::Empty)?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(GenerationError::Content(
                "response stopped by content filter".to_string(),
            ));
        }

        if let Some(call) = choice.message.tool_calls.into_iter().next() {
            return Ok(call.function.arguments);
        }

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => {
                tracing::warn!(
                    function = request.schema.name,
                    "Model answered without calling the function"
                );
                Ok(text)
            }
            _ => Err(GenerationError::Empty),
        }
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}
