use clap::{Parser, ValueEnum};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::ConfigError;

#[derive(Debug, Parser)]
#[command(version, about = "Relays payment requests to a provider and takes its callbacks")]
pub struct Config {
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 9999)]
    pub port: u16,

    /// Prefix for the payment routes.
    #[arg(long, env = "GATEWAY_BASE_PATH", default_value = "/payments")]
    pub base_path: String,

    /// Where initiated payments are sent.
    #[arg(long, env = "PROVIDER_URL")]
    pub provider_url: String,

    /// Where success/fail callbacks are reported. Only logged when unset.
    #[arg(long, env = "STATUS_URL")]
    pub status_url: Option<String>,

    /// Extra `Name: value` header for every provider call. Values may
    /// contain commas.
    #[arg(long = "provider-header")]
    pub provider_headers: Vec<String>,

    /// `;` separated `Name: value` headers, appended after `--provider-header`.
    #[arg(long = "provider-headers", env = "PROVIDER_HEADERS", value_delimiter = ';')]
    pub provider_header_list: Vec<String>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Config::parse()
    }

    pub fn headers(&self) -> Result<HeaderMap, ConfigError> {
        let raw: Vec<String> = self
            .provider_headers
            .iter()
            .chain(&self.provider_header_list)
            .filter(|h| !h.trim().is_empty())
            .cloned()
            .collect();

        parse_headers(&raw)
    }
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::with_capacity(raw.len());

    for header in raw {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| ConfigError::MalformedHeader(header.clone()))?;

        let invalid = |reason: String| ConfigError::InvalidHeader {
            header: header.clone(),
            reason,
        };

        let name = HeaderName::try_from(name.trim()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::try_from(value.trim()).map_err(|e| invalid(e.to_string()))?;

        headers.append(name, value);
    }

    Ok(headers)
}
