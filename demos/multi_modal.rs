use colored::*;
use dotenv::dotenv;
use prompt_library_client::{
    is_multi_modal, normalize_content, ContentPart, ImageDetail, ImageUrl, PromptInput,
    PromptLibraryClient,
};
use std::error::Error;
use tracing_subscriber::EnvFilter;

const PROMPT_ID: &str = "vision/describe";
const IMAGE_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/4/47/PNG_transparency_demonstration_1.png";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = PromptLibraryClient::from_env()?;

    // An optional local image is inlined as a data URL
    let image = match std::env::args().nth(1) {
        Some(path) => ImageUrl::from_path(path)?,
        None => ImageUrl::new(IMAGE_URL),
    };

    let input = PromptInput::new(vec![
        ContentPart::text("Describe this image in one sentence:"),
        ContentPart::image(image.with_detail(ImageDetail::Low)),
        ContentPart::text("Mention the dominant colors."),
    ])
    .meta_entry("version", "1.0.0");

    let saved = client.save(PROMPT_ID, &input).await?;
    println!("{} {}", "Saved:".green(), saved);

    let prompt = client.fetch(PROMPT_ID, saved.version()).await?;
    println!(
        "{} {}",
        "Multi-modal:".yellow(),
        is_multi_modal(&prompt).to_string().bright_yellow()
    );

    println!("\n{}", "🧩 Parts:".cyan().bold());
    for (i, part) in normalize_content(&prompt.content).iter().enumerate() {
        match part {
            ContentPart::Text { text } => println!("{:>2}. {} {}", i + 1, "text ".blue(), text),
            ContentPart::Image { image_url } => println!(
                "{:>2}. {} {} (detail: {})",
                i + 1,
                "image".magenta(),
                truncate(&image_url.url, 60),
                image_url
                    .detail
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "auto".into())
            ),
        }
    }

    println!("\n{}", "📄 Text only:".cyan().bold());
    println!("{}", prompt.content.text_only());

    client.delete(PROMPT_ID).await?;
    println!("\n{}", "✅ Done!".green().bold());
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        format!("{}…", text.chars().take(max).collect::<String>())
    }
}
