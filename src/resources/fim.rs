//! Fill-in-the-middle (FIM) code completion API.
//!
//! The model completes the code between `prompt` and an optional `suffix`.
//! Responses and streamed chunks share their shape with chat completion.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::{Endpoint, MistralClient, StreamingEndpoint};
use crate::model::{ChatCompletionResponse, CompletionChunk};

pub type FimCompletionResponse = ChatCompletionResponse;

/// Handle for `/v1/fim/completions`, obtained from [`MistralClient::fim`].
#[derive(Debug, Clone, Copy)]
pub struct Fim<'a> {
    client: &'a MistralClient,
}

impl<'a> Fim<'a> {
    pub(crate) fn new(client: &'a MistralClient) -> Self {
        Self { client }
    }
}

impl Endpoint for Fim<'_> {
    type Request = FimCompletionRequest;
    type Response = FimCompletionResponse;
    const PATH: &'static str = "/v1/fim/completions";

    fn client(&self) -> &MistralClient {
        self.client
    }

    fn disable_streaming(request: &mut Self::Request) {
        request.stream = None;
    }
}

impl StreamingEndpoint for Fim<'_> {
    type Chunk = CompletionChunk;

    fn enable_streaming(request: &mut Self::Request) {
        request.stream = Some(true);
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FimCompletionRequest {
    pub model: String,
    /// Code before the insertion point
    pub prompt: String,
    /// Code after the insertion point
    pub suffix: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    pub min_tokens: Option<u32>,
    pub stream: Option<bool>,
    pub stop: Option<Vec<String>>,
    pub random_seed: Option<u64>,
}

impl FimCompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            suffix: None,
            temperature: None,
            top_p: None,
            max_tokens: None,
            min_tokens: None,
            stream: None,
            stop: None,
            random_seed: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_min_tokens(mut self, min_tokens: u32) -> Self {
        self.min_tokens = Some(min_tokens);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }
}
