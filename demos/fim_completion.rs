//! Fill-in-the-middle code completion, blocking and streamed.
//!
//! Run with:
//! ```bash
//! export MISTRAL_API_KEY="your-api-key"
//! cargo run --example fim_completion
//! ```

use futures::StreamExt;
use mistral_client::client::{Endpoint, MistralClient, StreamingEndpoint};
use mistral_client::resources::fim::FimCompletionRequest;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = MistralClient::from_env()?;

    let request = FimCompletionRequest::new("codestral-latest", "def fibonacci(n: int):")
        .with_suffix("n = int(input('Enter a number: '))\nprint(fibonacci(n))")
        .with_max_tokens(128);

    let response = client.fim().complete(request.clone()).await?;
    println!("=== Completion ===\n{}", response.text().unwrap_or_default());

    println!("\n=== Streamed ===");
    let mut stream = client.fim().stream(request).await?;
    while let Some(chunk) = stream.next().await {
        print!("{}", chunk?.delta_text().unwrap_or_default());
    }
    println!();

    Ok(())
}
