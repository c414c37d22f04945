//! Streaming support types.

use futures::Stream;
use std::pin::Pin;

use crate::client::ClientError;

/// A stream of typed chunks decoded from an SSE response body.
///
/// Ends at the `[DONE]` sentinel, when the server closes the connection, or
/// after yielding the first error.
pub type ChunkStream<T> = Pin<Box<dyn Stream<Item = Result<T, ClientError>> + Send>>;

// Chunk types of every streaming endpoint, re-exported for convenience.
pub use crate::model::CompletionChunk;
pub use crate::resources::audio::TranscriptionEvent;
pub use crate::resources::conversations::ConversationEvent;
