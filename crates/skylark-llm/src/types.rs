use serde::{Deserialize, Serialize};

/// Token accounting for a single `Send`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt: u32,
    pub completion: u32,
    pub total: u32,
}

/// One provider-initiated tool call returned alongside a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub fn_name: String,
    /// Raw JSON text of the call's arguments, validated the same way as a
    /// direct-tool invocation before execution.
    pub fn_args: String,
}

/// Options passed to `Provider::send`, per the orchestrator's fixed request
/// shape: `{model, temperature: 0.7, maxTokens: 2000}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SendOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// The universal provider response: `{content, usage, toolCalls?, error?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub content: String,
    pub usage: Option<Usage>,
    pub tool_calls: Vec<ToolCall>,
    pub error: Option<String>,
}
