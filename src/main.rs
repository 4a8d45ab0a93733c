use std::sync::Arc;

use log::{error, info};

use wikisum::config::ServiceConfig;
use wikisum::pipeline::Summarizer;
use wikisum::providers::MistralClient;
use wikisum::server;
use wikisum::wiki::MediaWikiClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   dotenvy::dotenv().ok();

    let config = ServiceConfig::from_env();
    let filter = match &config
    {   Ok(c) if c.debug => "debug"
      , _ => "info"
    };
    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or(filter)
    ).init();

    let config = config.map_err(|e| {
      error!("Cannot start: {}", e);
      e
    })?;
    info!(
      "Starting wikisum on port {} ({} credentials, debug={})",
      config.port, config.credentials.len(), config.debug
    );

    let transport = MistralClient::new(
      config.provider.api_base.clone(),
      config.timeout()
    )?;
    let source = MediaWikiClient::with_api(
      config.wiki_api.clone(),
      config.timeout()
    )?;
    let service = Summarizer::from_config(&config, transport, source)?;

    server::serve(Arc::new(service), config.port).await?;
    Ok(())
}
