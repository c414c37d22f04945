//! Streaming chat completion.
//!
//! Run with:
//! ```bash
//! export MISTRAL_API_KEY="your-api-key"
//! RUST_LOG=mistral_client=debug cargo run --example chat_streaming
//! ```

use std::io::Write;

use futures::StreamExt;
use mistral_client::client::{MistralClient, StreamingEndpoint};
use mistral_client::model::ChatMessage;
use mistral_client::resources::chat::ChatCompletionRequest;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Reads MISTRAL_API_KEY (and MISTRAL_BASE_URL, if set)
    let client = MistralClient::from_env()?;

    let request = ChatCompletionRequest::new(
        "mistral-small-latest",
        vec![
            ChatMessage::system("You are a concise assistant."),
            ChatMessage::user("Write a haiku about Rust programming."),
        ],
    )
    .with_temperature(0.9)
    .with_max_tokens(256);

    println!("Streaming response...\n");

    let mut stream = client.chat().stream(request).await?;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Some(text) = chunk.delta_text() {
            print!("{}", text);
            std::io::stdout().flush()?;
        }
        if let Some(usage) = &chunk.usage {
            println!(
                "\n\n=== Usage ===\nPrompt tokens: {}\nCompletion tokens: {}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
    }

    Ok(())
}
