//! Start a conversation, then continue it, streaming both turns.
//!
//! Run with:
//! ```bash
//! export MISTRAL_API_KEY="your-api-key"
//! cargo run --example conversation_streaming
//! ```

use futures::StreamExt;
use mistral_client::client::{MistralClient, StreamingEndpoint};
use mistral_client::resources::conversations::{
    ConversationAppendRequest, ConversationEvent, ConversationRequest,
};
use mistral_client::ChunkStream;

/// Print a streamed turn and return the conversation id it reported.
async fn print_turn(
    mut stream: ChunkStream<ConversationEvent>,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let mut conversation_id = None;

    while let Some(event) = stream.next().await {
        match event? {
            ConversationEvent::ResponseStarted {
                conversation_id: id,
                ..
            } => conversation_id = Some(id),
            ConversationEvent::MessageOutputDelta { content, .. } => print!("{}", content.text()),
            ConversationEvent::ToolExecutionStarted { name, .. } => println!("[running {}]", name),
            ConversationEvent::ResponseError { message, .. } => eprintln!("\nerror: {}", message),
            ConversationEvent::ResponseDone { usage, .. } => {
                println!("\n({} tokens)", usage.total_tokens)
            }
            _ => {}
        }
    }

    Ok(conversation_id)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = MistralClient::from_env()?;

    let request = ConversationRequest::new("mistral-medium-latest", "Name three rivers in France.")
        .with_instructions("Answer briefly.");
    let stream = client.conversations().stream(request).await?;

    let Some(conversation_id) = print_turn(stream).await? else {
        return Err("stream ended before the conversation started".into());
    };

    let follow_up = ConversationAppendRequest::new("Which one is the longest?");
    let stream = client
        .conversations()
        .append_stream(&conversation_id, follow_up)
        .await?;
    print_turn(stream).await?;

    Ok(())
}
