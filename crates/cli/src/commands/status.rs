//! `playground status` — Show the effective configuration.

use playground_config::AppConfig;

fn redact(token: Option<&str>) -> String {
    match token {
        Some(t) if t.chars().count() > 6 => format!("{}…", t.chars().take(3).collect::<String>()),
        Some(_) => "set".to_string(),
        None => "not set".to_string(),
    }
}

pub async fn run(token: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(token)?;

    println!("LLM Playground Status");
    println!("=====================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Token:        {}", redact(config.api_token.as_deref()));
    println!("  Model:        {}", config.default_model);
    println!("  Max tokens:   {}", config.max_tokens);
    match config.temperature {
        Some(t) => println!("  Temperature:  {t}"),
        None => println!("  Temperature:  service default"),
    }
    println!("  Fallback:     {:?}", config.fallback);
    println!("  Inference:    {}", config.inference.api_url);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  Export dir:   {}", config.export.dir.display());

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `playground onboard` first");
    }

    Ok(())
}
