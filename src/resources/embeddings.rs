//! Embeddings API.

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize, Serializer};
use serde_with::skip_serializing_none;

use crate::client::{ClientError, Endpoint, MistralClient};
use crate::model::UsageInfo;

/// Handle for `/v1/embeddings`, obtained from [`MistralClient::embeddings`].
#[derive(Debug, Clone, Copy)]
pub struct Embeddings<'a> {
    client: &'a MistralClient,
}

impl<'a> Embeddings<'a> {
    pub(crate) fn new(client: &'a MistralClient) -> Self {
        Self { client }
    }
}

impl Endpoint for Embeddings<'_> {
    type Request = EmbeddingRequest;
    type Response = EmbeddingResponse;
    const PATH: &'static str = "/v1/embeddings";

    fn client(&self) -> &MistralClient {
        self.client
    }
}

/// Texts to embed; the API rejects an empty batch.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    #[serde(serialize_with = "serialize_inputs")]
    pub input: NonEmpty<String>,
    pub output_dimension: Option<u32>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: NonEmpty<String>) -> Self {
        Self {
            model: model.into(),
            input,
            output_dimension: None,
        }
    }

    /// Build a request from a list of texts, rejecting an empty list.
    pub fn from_texts(model: impl Into<String>, texts: Vec<String>) -> Result<Self, ClientError> {
        let input = NonEmpty::from_vec(texts)
            .ok_or_else(|| ClientError::Config("embedding input must not be empty".to_string()))?;
        Ok(Self::new(model, input))
    }

    /// Embed a single text.
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(model, NonEmpty::new(text.into()))
    }

    pub fn with_output_dimension(mut self, dimension: u32) -> Self {
        self.output_dimension = Some(dimension);
        self
    }
}

fn serialize_inputs<S: Serializer>(
    input: &NonEmpty<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(input.iter())
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub id: String,
    pub object: Option<String>,
    pub model: String,
    #[serde(default)]
    pub usage: UsageInfo,
    pub data: Vec<EmbeddingData>,
}

impl EmbeddingResponse {
    /// Embedding vectors ordered by input position.
    pub fn vectors(&self) -> Vec<&[f32]> {
        let mut data: Vec<&EmbeddingData> = self.data.iter().collect();
        data.sort_by_key(|d| d.index);
        data.into_iter().map(|d| d.embedding.as_slice()).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    pub object: Option<String>,
    pub embedding: Vec<f32>,
    pub index: u32,
}
