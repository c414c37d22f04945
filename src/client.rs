//! Core client, endpoint traits and error types.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::http::{add_extra_headers, build_http_client, RequestBuilderExt, ResponseExt};
use crate::options::TransportOptions;
use crate::resources::{Audio, Chat, Conversations, Embeddings, Fim};
use crate::sse::SSEResponseExt;
use crate::stream::ChunkStream;

const JSON: &str = "application/json";
const EVENT_STREAM: &str = "text/event-stream";

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid UTF-8 in stream payload: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Client for the Mistral API.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
/// ```no_run
/// use mistral_client::client::{Endpoint, MistralClient};
/// use mistral_client::model::ChatMessage;
/// use mistral_client::resources::chat::ChatCompletionRequest;
///
/// # async fn run() -> Result<(), mistral_client::ClientError> {
/// let client = MistralClient::from_env()?;
/// let request = ChatCompletionRequest::new(
///     "mistral-small-latest",
///     vec![ChatMessage::user("Hello!")],
/// );
/// let response = client.chat().complete(request).await?;
/// println!("{:?}", response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MistralClient {
    http: reqwest::Client,
    options: TransportOptions,
}

impl MistralClient {
    /// Create a client, building an HTTP client from the transport options.
    pub fn new(options: TransportOptions) -> Result<Self, ClientError> {
        let http = build_http_client(&options)?;
        Self::with_http_client(options, http)
    }

    /// Create a client around an existing `reqwest::Client`.
    ///
    /// The options' timeout and proxy are ignored; those belong to `http`.
    pub fn with_http_client(
        options: TransportOptions,
        http: reqwest::Client,
    ) -> Result<Self, ClientError> {
        if options.api_key.is_none() {
            return Err(ClientError::Config("API key is required".to_string()));
        }
        Ok(Self { http, options })
    }

    /// Create a client configured from `MISTRAL_API_KEY` and `MISTRAL_BASE_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(TransportOptions::from_env()?)
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn chat(&self) -> Chat<'_> {
        Chat::new(self)
    }

    pub fn fim(&self) -> Fim<'_> {
        Fim::new(self)
    }

    pub fn embeddings(&self) -> Embeddings<'_> {
        Embeddings::new(self)
    }

    pub fn conversations(&self) -> Conversations<'_> {
        Conversations::new(self)
    }

    pub fn audio(&self) -> Audio<'_> {
        Audio::new(self)
    }

    fn request(&self, method: Method, path: &str, accept: &'static str) -> RequestBuilder {
        let url = format!("{}{}", self.options.base_url().trim_end_matches('/'), path);
        debug!(%method, %url, "dispatching request");

        let mut req = self
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static(accept));

        if let Some(api_key) = &self.options.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        add_extra_headers(req, &self.options.extra_headers)
    }

    async fn execute(&self, req: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = req.send().await?.ensure_success().await?;
        debug!(status = %response.status(), "response received");
        Ok(response)
    }

    /// POST a JSON body and decode a JSON response.
    pub(crate) async fn send_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let req = self.request(Method::POST, path, JSON).json_logged(body);
        self.execute(req).await?.json_logged().await
    }

    /// POST a JSON body and open the response as an event stream.
    pub(crate) async fn send_json_stream<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ChunkStream<T>, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send + 'static,
    {
        let req = self.request(Method::POST, path, EVENT_STREAM).json_logged(body);
        let response = self.execute(req).await?;
        Ok(Box::pin(response.sse_events::<T>()))
    }

    /// POST a multipart form and decode a JSON response.
    pub(crate) async fn send_multipart<R>(&self, path: &str, form: Form) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let req = self.request(Method::POST, path, JSON).multipart(form);
        self.execute(req).await?.json_logged().await
    }

    /// POST a multipart form and open the response as an event stream.
    pub(crate) async fn send_multipart_stream<T>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<ChunkStream<T>, ClientError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let req = self.request(Method::POST, path, EVENT_STREAM).multipart(form);
        let response = self.execute(req).await?;
        Ok(Box::pin(response.sse_events::<T>()))
    }
}

/// A JSON endpoint with a single request and response shape.
///
/// Implemented by the resource handles returned from [`MistralClient`].
///
/// # Example
/// ```rust,ignore
/// impl Endpoint for Embeddings<'_> {
///     type Request = EmbeddingRequest;
///     type Response = EmbeddingResponse;
///     const PATH: &'static str = "/v1/embeddings";
///
///     fn client(&self) -> &MistralClient {
///         self.client
///     }
/// }
/// ```
#[async_trait]
pub trait Endpoint: Send + Sync {
    type Request: Serialize + Send + Sync;
    type Response: DeserializeOwned + Send;

    /// Path relative to the configured base URL.
    const PATH: &'static str;

    fn client(&self) -> &MistralClient;

    /// Clear any streaming flag on `request`. No-op for endpoints that never stream.
    fn disable_streaming(_request: &mut Self::Request) {}

    /// Send `request` and wait for the full response.
    ///
    /// A streaming flag set on `request` is cleared first; use
    /// [`StreamingEndpoint::stream`] for an event stream.
    async fn complete(&self, mut request: Self::Request) -> Result<Self::Response, ClientError> {
        Self::disable_streaming(&mut request);
        debug!(path = Self::PATH, "completion request");
        self.client().send_json(Self::PATH, &request).await
    }
}

/// Extension trait for endpoints that can answer with an event stream.
#[async_trait]
pub trait StreamingEndpoint: Endpoint {
    /// One decoded `data:` payload.
    type Chunk: DeserializeOwned + Send + 'static;

    /// Mark `request` as a streaming request.
    fn enable_streaming(request: &mut Self::Request);

    /// Send `request` with streaming enabled.
    ///
    /// The returned stream yields chunks as they arrive and ends at the
    /// `[DONE]` sentinel or when the server closes the connection. Dropping
    /// it closes the connection.
    async fn stream(
        &self,
        mut request: Self::Request,
    ) -> Result<ChunkStream<Self::Chunk>, ClientError> {
        Self::enable_streaming(&mut request);
        debug!(path = Self::PATH, "streaming request");
        self.client().send_json_stream(Self::PATH, &request).await
    }
}
