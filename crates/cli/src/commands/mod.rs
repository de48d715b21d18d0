pub mod chat;
pub mod models;
pub mod onboard;
pub mod serve;
pub mod status;

use playground_config::AppConfig;

/// Load the config and apply a `--token` override.
pub fn load_config(token: Option<String>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    apply_token(&mut config, token);
    Ok(config)
}

fn apply_token(config: &mut AppConfig, token: Option<String>) {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        config.api_token = Some(token);
    }
}

/// Fail with setup instructions when no token is configured.
pub fn ensure_token(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_token() {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No Hugging Face token configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    export HF_TOKEN='hf_...'");
    eprintln!("    export PLAYGROUND_HF_TOKEN='hf_...'   (takes priority)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    eprintln!("  Create a token at: https://huggingface.co/settings/tokens");
    eprintln!();
    Err("No Hugging Face token found. See above for setup instructions.".into())
}
