use colored::*;
use dotenv::dotenv;
use prompt_library_client::{PromptInput, PromptLibraryClient};
use std::error::Error;
use tracing_subscriber::EnvFilter;

const PROMPT_ID: &str = "examples/greeting";

/// Replaces `{{name}}` style placeholders in a template.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{{{}}}}}", name), value)
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // PLP_BASE_URL is required, PLP_API_KEY is optional
    let client = PromptLibraryClient::from_env()?;

    println!("{}", "📝 Creating prompt...".bright_blue().bold());
    let input = PromptInput::new("Hello {{name}}, welcome to {{product}}!")
        .meta_entry("version", "1.0.0")
        .meta_entry("author", "demo")
        .meta_entry("description", "A simple greeting prompt");
    let saved = client.put(PROMPT_ID, &input).await?;
    println!("{} {}", "Saved:".green(), saved);

    println!("\n{}", "🔎 Retrieving prompt...".bright_blue().bold());
    let prompt = client.get(PROMPT_ID, None).await?;
    println!("{} {}", "Content:".yellow(), prompt.content.text_only());
    println!(
        "{} {}",
        "Version:".yellow(),
        prompt.version().unwrap_or("latest")
    );

    let message = render(
        &prompt.content.text_only(),
        &[("name", "Alice"), ("product", "PLP")],
    );
    println!("{} {}", "Final message:".yellow(), message.white());

    println!("\n{}", "🗑️  Deleting prompt...".bright_blue().bold());
    client.delete(PROMPT_ID).await?;
    client.close();

    println!("{}", "✅ Done!".green().bold());
    Ok(())
}
