//! `briar serve` — Start the HTTP gateway.

use briar_config::AppConfig;

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;
    if let Some(port) = port {
        config.gateway.port = port;
    }

    briar_gateway::serve(config).await?;
    Ok(())
}
