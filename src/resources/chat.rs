//! Chat Completions API.
//! See: <https://docs.mistral.ai/api/#tag/chat>

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::{Endpoint, MistralClient, StreamingEndpoint};
use crate::model::{
    ChatCompletionResponse, ChatMessage, CompletionChunk, ResponseFormat, Tool, ToolChoice,
};

/// Handle for `/v1/chat/completions`, obtained from [`MistralClient::chat`].
#[derive(Debug, Clone, Copy)]
pub struct Chat<'a> {
    client: &'a MistralClient,
}

impl<'a> Chat<'a> {
    pub(crate) fn new(client: &'a MistralClient) -> Self {
        Self { client }
    }
}

impl Endpoint for Chat<'_> {
    type Request = ChatCompletionRequest;
    type Response = ChatCompletionResponse;
    const PATH: &'static str = "/v1/chat/completions";

    fn client(&self) -> &MistralClient {
        self.client
    }

    fn disable_streaming(request: &mut Self::Request) {
        request.stream = None;
    }
}

impl StreamingEndpoint for Chat<'_> {
    type Chunk = CompletionChunk;

    fn enable_streaming(request: &mut Self::Request) {
        request.stream = Some(true);
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
    pub stop: Option<Vec<String>>,
    pub random_seed: Option<u64>,
    pub response_format: Option<ResponseFormat>,
    pub tools: Option<Vec<Tool>>,
    pub tool_choice: Option<ToolChoice>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    /// Number of completions to return
    pub n: Option<u32>,
    pub parallel_tool_calls: Option<bool>,
    /// Prepend the provider's safety prompt
    pub safe_prompt: Option<bool>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            top_p: None,
            max_tokens: None,
            stream: None,
            stop: None,
            random_seed: None,
            response_format: None,
            tools: None,
            tool_choice: None,
            presence_penalty: None,
            frequency_penalty: None,
            n: None,
            parallel_tool_calls: None,
            safe_prompt: None,
        }
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-p sampling parameter.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>, choice: ToolChoice) -> Self {
        self.tools = Some(tools);
        self.tool_choice = Some(choice);
        self
    }

    pub fn with_safe_prompt(mut self, safe_prompt: bool) -> Self {
        self.safe_prompt = Some(safe_prompt);
        self
    }
}
