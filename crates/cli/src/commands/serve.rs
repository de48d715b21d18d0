//! `playground serve` — Start the browser playground.

pub async fn run(
    token: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(token)?;
    super::ensure_token(&config)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("LLM Playground");
    println!("   Open:   http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:  {}", config.default_model);

    playground_gateway::start(config).await?;

    Ok(())
}
