//! `playground models` — List the model catalog.

use playground_config::AppConfig;
use playground_core::models::SUPPORTED_MODELS;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("Available Models");
    println!("================");
    println!();
    for m in SUPPORTED_MODELS {
        let marker = if m.id == config.default_model { "(default)" } else { "" };
        println!("  {:<28} {:<40} {marker}", m.label, m.id);
    }
    println!();
    println!("  Any other Hugging Face model id also works:");
    println!("    playground chat --model <org/name>");
    println!("    default_model = \"<org/name>\"   (config.toml)");

    Ok(())
}
