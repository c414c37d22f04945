//! API resources, one module per endpoint family.

pub mod audio;
pub mod chat;
pub mod conversations;
pub mod embeddings;
pub mod fim;

// Re-export for convenience
pub use audio::Audio;
pub use chat::Chat;
pub use conversations::Conversations;
pub use embeddings::Embeddings;
pub use fim::Fim;
