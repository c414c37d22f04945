//! Conversations API.
//!
//! A conversation is a server-side history of entries (inputs, model
//! outputs, tool executions, handoffs). Starting or appending to one returns
//! the new entries, or, when streaming, a sequence of [`ConversationEvent`]s.
//! The stream also carries `event:` lines, which the decoder skips; every
//! `data:` payload names its own `type`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::client::{ClientError, Endpoint, MistralClient, StreamingEndpoint};
use crate::model::{Content, ResponseFormat, Role, Tool, ToolChoice, UsageInfo};
use crate::stream::ChunkStream;

/// Handle for `/v1/conversations`, obtained from [`MistralClient::conversations`].
#[derive(Debug, Clone, Copy)]
pub struct Conversations<'a> {
    client: &'a MistralClient,
}

impl<'a> Conversations<'a> {
    pub(crate) fn new(client: &'a MistralClient) -> Self {
        Self { client }
    }

    /// Append inputs to an existing conversation.
    pub async fn append(
        &self,
        conversation_id: &str,
        mut request: ConversationAppendRequest,
    ) -> Result<ConversationResponse, ClientError> {
        request.stream = None;
        self.client
            .send_json(&append_path(conversation_id), &request)
            .await
    }

    /// Append inputs to an existing conversation and stream the reply.
    pub async fn append_stream(
        &self,
        conversation_id: &str,
        mut request: ConversationAppendRequest,
    ) -> Result<ChunkStream<ConversationEvent>, ClientError> {
        request.stream = Some(true);
        self.client
            .send_json_stream(&append_path(conversation_id), &request)
            .await
    }
}

const CONVERSATIONS_PATH: &str = "/v1/conversations";

/// The id is percent-encoded so it always stays a single path segment.
fn append_path(conversation_id: &str) -> String {
    format!("{}/{}", CONVERSATIONS_PATH, urlencoding::encode(conversation_id))
}

impl Endpoint for Conversations<'_> {
    type Request = ConversationRequest;
    type Response = ConversationResponse;
    const PATH: &'static str = CONVERSATIONS_PATH;

    fn client(&self) -> &MistralClient {
        self.client
    }

    fn disable_streaming(request: &mut Self::Request) {
        request.stream = None;
    }
}

impl StreamingEndpoint for Conversations<'_> {
    type Chunk = ConversationEvent;

    fn enable_streaming(request: &mut Self::Request) {
        request.stream = Some(true);
    }
}

/// Who runs handoffs between agents.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandoffExecution {
    Client,
    Server,
}

/// Inputs of a conversation turn: a plain prompt or explicit entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConversationInputs {
    Text(String),
    Entries(Vec<ConversationEntry>),
}

impl From<&str> for ConversationInputs {
    fn from(text: &str) -> Self {
        ConversationInputs::Text(text.to_string())
    }
}

impl From<String> for ConversationInputs {
    fn from(text: String) -> Self {
        ConversationInputs::Text(text)
    }
}

impl From<Vec<ConversationEntry>> for ConversationInputs {
    fn from(entries: Vec<ConversationEntry>) -> Self {
        ConversationInputs::Entries(entries)
    }
}

/// Sampling parameters for conversation turns.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionArgs {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    pub random_seed: Option<u64>,
    pub stop: Option<Vec<String>>,
    pub response_format: Option<ResponseFormat>,
    pub tool_choice: Option<ToolChoice>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
}

/// Start a conversation, with either a `model` or an `agent_id`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRequest {
    pub inputs: ConversationInputs,
    pub model: Option<String>,
    pub agent_id: Option<String>,
    pub instructions: Option<String>,
    pub tools: Option<Vec<Tool>>,
    pub completion_args: Option<CompletionArgs>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Persist the conversation server-side
    pub store: Option<bool>,
    pub handoff_execution: Option<HandoffExecution>,
    pub stream: Option<bool>,
}

impl ConversationRequest {
    fn from_inputs(inputs: ConversationInputs) -> Self {
        Self {
            inputs,
            model: None,
            agent_id: None,
            instructions: None,
            tools: None,
            completion_args: None,
            name: None,
            description: None,
            store: None,
            handoff_execution: None,
            stream: None,
        }
    }

    /// Converse with a model directly.
    pub fn new(model: impl Into<String>, inputs: impl Into<ConversationInputs>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::from_inputs(inputs.into())
        }
    }

    /// Converse with a configured agent.
    pub fn for_agent(agent_id: impl Into<String>, inputs: impl Into<ConversationInputs>) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            ..Self::from_inputs(inputs.into())
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_completion_args(mut self, args: CompletionArgs) -> Self {
        self.completion_args = Some(args);
        self
    }

    pub fn with_store(mut self, store: bool) -> Self {
        self.store = Some(store);
        self
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationAppendRequest {
    pub inputs: ConversationInputs,
    pub completion_args: Option<CompletionArgs>,
    pub store: Option<bool>,
    pub handoff_execution: Option<HandoffExecution>,
    pub stream: Option<bool>,
}

impl ConversationAppendRequest {
    pub fn new(inputs: impl Into<ConversationInputs>) -> Self {
        Self {
            inputs: inputs.into(),
            completion_args: None,
            store: None,
            handoff_execution: None,
            stream: None,
        }
    }
}

/// An entry in a conversation history.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConversationEntry {
    #[serde(rename = "message.input")]
    MessageInput {
        role: Role,
        content: Content,
        id: Option<String>,
        created_at: Option<String>,
    },
    #[serde(rename = "message.output")]
    MessageOutput {
        content: Content,
        role: Option<Role>,
        id: Option<String>,
        agent_id: Option<String>,
        model: Option<String>,
        created_at: Option<String>,
        completed_at: Option<String>,
    },
    #[serde(rename = "function.call")]
    FunctionCall {
        tool_call_id: String,
        name: String,
        /// JSON-encoded arguments
        arguments: String,
        id: Option<String>,
    },
    #[serde(rename = "function.result")]
    FunctionResult {
        tool_call_id: String,
        result: String,
        id: Option<String>,
    },
    #[serde(rename = "tool.execution")]
    ToolExecution {
        name: String,
        id: Option<String>,
        info: Option<Value>,
    },
    #[serde(rename = "agent.handoff")]
    AgentHandoff {
        previous_agent_id: Option<String>,
        previous_agent_name: Option<String>,
        next_agent_id: Option<String>,
        next_agent_name: Option<String>,
        id: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ConversationEntry {
    /// A user message input.
    pub fn user(content: impl Into<Content>) -> Self {
        ConversationEntry::MessageInput {
            role: Role::User,
            content: content.into(),
            id: None,
            created_at: None,
        }
    }

    /// The client-side result of a `function.call` entry.
    pub fn function_result(tool_call_id: impl Into<String>, result: impl Into<String>) -> Self {
        ConversationEntry::FunctionResult {
            tool_call_id: tool_call_id.into(),
            result: result.into(),
            id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationResponse {
    pub object: Option<String>,
    pub conversation_id: String,
    pub outputs: Vec<ConversationEntry>,
    #[serde(default)]
    pub usage: UsageInfo,
}

impl ConversationResponse {
    /// Text of all message outputs, in order.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|entry| match entry {
                ConversationEntry::MessageOutput { content, .. } => Some(content.text()),
                _ => None,
            })
            .collect()
    }
}

/// One event of a streamed conversation turn.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConversationEvent {
    #[serde(rename = "conversation.response.started")]
    ResponseStarted {
        conversation_id: String,
        created_at: Option<String>,
    },
    #[serde(rename = "conversation.response.done")]
    ResponseDone {
        #[serde(default)]
        usage: UsageInfo,
        created_at: Option<String>,
    },
    #[serde(rename = "conversation.response.error")]
    ResponseError {
        message: String,
        code: Option<i64>,
        created_at: Option<String>,
    },
    #[serde(rename = "message.output.delta")]
    MessageOutputDelta {
        content: Content,
        output_index: Option<u32>,
        content_index: Option<u32>,
        id: Option<String>,
        model: Option<String>,
        agent_id: Option<String>,
        role: Option<Role>,
        created_at: Option<String>,
    },
    #[serde(rename = "tool.execution.started")]
    ToolExecutionStarted {
        name: String,
        output_index: Option<u32>,
        id: Option<String>,
        created_at: Option<String>,
    },
    #[serde(rename = "tool.execution.done")]
    ToolExecutionDone {
        name: String,
        output_index: Option<u32>,
        id: Option<String>,
        info: Option<Value>,
        created_at: Option<String>,
    },
    #[serde(rename = "agent.handoff.started")]
    AgentHandoffStarted {
        previous_agent_id: Option<String>,
        previous_agent_name: Option<String>,
        output_index: Option<u32>,
        id: Option<String>,
        created_at: Option<String>,
    },
    #[serde(rename = "agent.handoff.done")]
    AgentHandoffDone {
        next_agent_id: Option<String>,
        next_agent_name: Option<String>,
        output_index: Option<u32>,
        id: Option<String>,
        created_at: Option<String>,
    },
    #[serde(rename = "function.call.delta")]
    FunctionCallDelta {
        name: String,
        tool_call_id: String,
        /// Partial JSON-encoded arguments
        arguments: String,
        output_index: Option<u32>,
        id: Option<String>,
        created_at: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ConversationEvent {
    /// Text carried by a message output delta.
    pub fn delta_text(&self) -> Option<String> {
        match self {
            ConversationEvent::MessageOutputDelta { content, .. } => Some(content.text()),
            _ => None,
        }
    }
}
