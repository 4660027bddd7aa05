mod api;
mod config;
mod data;
mod error;
mod processor;
mod relay;

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, LogFormat},
    processor::ProviderProcessor,
    relay::Relay,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    init_tracing(config.log_format);

    let headers = config.headers()?;

    tracing::info!(
        provider = %config.provider_url,
        status = ?config.status_url,
        base_path = %config.base_path,
        "gateway config"
    );

    let client = reqwest::Client::new();

    let processor = ProviderProcessor::new(
        Relay::new(client),
        config.provider_url.clone(),
        config.status_url.clone(),
        headers,
    );

    let app = api::router(&config.base_path, Arc::new(processor));

    api::serve(config.port, app).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
