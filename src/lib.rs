//! # mistral-client - typed client for the Mistral API
//!
//! An async client for chat and FIM completion, embeddings, conversations and
//! audio transcription, with first-class streaming.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Typed request/response models per endpoint
//! - Streaming via Server-Sent Events, decoded lazily into typed chunks
//! - A blocking SSE decoder for recorded or non-async bodies
//!
//! ## Architecture
//!
//! [`MistralClient`] owns the HTTP client and transport options and hands out
//! lightweight resource handles (`chat()`, `fim()`, `conversations()`, ...).
//! JSON resources implement [`Endpoint`] and, when they can stream,
//! [`StreamingEndpoint`]. Streaming responses go through the [`sse`] decoder,
//! which yields one JSON payload per `data:` line until `[DONE]`, and each
//! payload is then mapped to the endpoint's chunk type.
//!
//! ## Example
//! ```no_run
//! use futures::StreamExt;
//! use mistral_client::client::{MistralClient, StreamingEndpoint};
//! use mistral_client::model::ChatMessage;
//! use mistral_client::options::{SecretString, TransportOptions};
//! use mistral_client::resources::chat::ChatCompletionRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MistralClient::new(TransportOptions::new(SecretString::from("your-api-key")))?;
//!
//!     let request = ChatCompletionRequest::new(
//!         "mistral-small-latest",
//!         vec![ChatMessage::user("Hello!")],
//!     );
//!
//!     let mut stream = client.chat().stream(request).await?;
//!     while let Some(chunk) = stream.next().await {
//!         if let Some(text) = chunk?.delta_text() {
//!             print!("{}", text);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod resources;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use client::{ClientError, Endpoint, MistralClient, StreamingEndpoint};
pub use model::{ChatMessage, CompletionChunk, Content};
pub use stream::ChunkStream;
