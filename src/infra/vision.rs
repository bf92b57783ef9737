//! Vision-model client: an OpenAI-compatible chat completion that returns
//! its answer through a single function tool.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error type for vision calls.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// A body or tool argument string was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(String),

    /// The completion contained no choices.
    #[error("no choices in completion response")]
    NoChoices,

    /// The first choice did not call a tool.
    #[error("no tool calls found")]
    NoToolCall,
}

/// A structured-output request: prompt, images, and the tool schema the
/// answer must follow.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Text part of the user message.
    pub prompt: String,
    /// Image URLs (typically `data:` URIs), in message order.
    pub image_urls: Vec<String>,
    /// Name of the function tool the model must call.
    pub tool_name: String,
    /// Description of the function tool.
    pub tool_description: String,
    /// JSON schema of the tool parameters.
    pub parameters: Value,
}

/// Trait for vision clients.
#[async_trait]
pub trait VisionClient: Send + Sync + 'static {
    /// Model name sent with each request.
    fn model(&self) -> &str;

    /// Run the request and return the raw argument string of the tool call.
    async fn call_tool(&self, request: VisionRequest) -> Result<String, VisionError>;
}

/// Default API root.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat completions client.
pub struct OpenAiVisionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiVisionClient {
    /// Create a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VisionError::Http(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Set a custom API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    tools: Vec<ToolSpec>,
    tool_choice: ToolChoice,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ToolSpec {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionSpec,
}

#[derive(Debug, Serialize)]
struct FunctionSpec {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolChoiceFunction,
}

#[derive(Debug, Serialize)]
struct ToolChoiceFunction {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    // Some compatible servers send `"tool_calls": null`.
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: ToolCallFunction,
}

#[derive(Debug, Deserialize)]
struct ToolCallFunction {
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn build_request<'a>(model: &'a str, request: VisionRequest) -> ChatRequest<'a> {
    let mut content = Vec::with_capacity(request.image_urls.len() + 1);
    content.push(ContentPart::Text {
        text: request.prompt,
    });
    content.extend(request.image_urls.into_iter().map(|url| ContentPart::ImageUrl {
        image_url: ImageUrl { url },
    }));

    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content,
        }],
        tools: vec![ToolSpec {
            kind: "function",
            function: FunctionSpec {
                name: request.tool_name.clone(),
                description: request.tool_description,
                parameters: request.parameters,
            },
        }],
        tool_choice: ToolChoice {
            kind: "function",
            function: ToolChoiceFunction {
                name: request.tool_name,
            },
        },
    }
}

/// Extract the first tool call's argument string from a completion body.
///
/// # Errors
///
/// Returns [`VisionError::Json`] for a malformed body,
/// [`VisionError::NoChoices`] or [`VisionError::NoToolCall`] when the
/// expected parts are missing.
pub fn parse_tool_arguments(body: &str) -> Result<String, VisionError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| VisionError::Json(e.to_string()))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(VisionError::NoChoices)?;
    choice
        .message
        .tool_calls
        .into_iter()
        .flatten()
        .next()
        .map(|call| call.function.arguments)
        .ok_or(VisionError::NoToolCall)
}

fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn call_tool(&self, request: VisionRequest) -> Result<String, VisionError> {
        let body = build_request(&self.model, request);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VisionError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(VisionError::Api {
                status: status.as_u16(),
                message: api_error_message(text),
            });
        }

        parse_tool_arguments(&text)
    }
}
