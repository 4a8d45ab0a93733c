//! Configuration for the summarizer service and its failover behavior

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Credential variables read at startup, in pool order.
pub const CREDENTIAL_VARS: [&str; 3]
  = ["MISTRAL_KEY_1", "MISTRAL_KEY_2", "MISTRAL_KEY_3"];

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_CONTENT_CAP: usize = 8000;

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// API base URL
    pub api_base: String
  , /// Primary model tier
    pub large_model: String
  , /// Fallback model tier, tried on capacity errors
    pub small_model: String
  , /// Request timeout in seconds
    pub timeout_secs: u64
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   api_base: crate::providers::mistral::MISTRAL_API_BASE
              .to_string()
          , large_model: "mistral-large-latest".to_string()
          , small_model: "mistral-small-latest".to_string()
          , timeout_secs: 30
        }
    }
}

/// Failover configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig
{   /// Fixed pause between two credential attempts, in milliseconds
    pub backoff_ms: u64
}

impl Default for FailoverConfig
{   fn default() -> Self
    {   FailoverConfig
        {   backoff_ms: 2000
        }
    }
}

impl FailoverConfig
{   pub fn backoff(&self) -> Duration
    {   Duration::from_millis(self.backoff_ms)
    }
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig
{   /// Listen port
    pub port: u16
  , /// Verbose logging
    pub debug: bool
  , /// LLM credentials, in rotation order
    #[serde(skip_serializing)]
    pub credentials: Vec<String>
  , pub provider: ProviderConfig
  , pub failover: FailoverConfig
  , /// Article body cap, in characters
    pub content_cap: usize
  , /// MediaWiki action API, `{lang}` standing for the edition code
    pub wiki_api: String
}

impl Default for ServiceConfig
{   fn default() -> Self
    {   ServiceConfig
        {   port: DEFAULT_PORT
          , debug: false
          , credentials: vec![]
          , provider: ProviderConfig::default()
          , failover: FailoverConfig::default()
          , content_cap: DEFAULT_CONTENT_CAP
          , wiki_api: crate::wiki::mediawiki::WIKIPEDIA_API.to_string()
        }
    }
}

impl ServiceConfig
{   /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where F: Fn(&str) -> Option<String>
    {   let mut config = ServiceConfig::default();

        if let Some(port) = lookup("PORT")
        {   config.port = port.trim().parse().map_err(|_| {
              Error::InvalidConfiguration(
                format!("PORT is not a valid port: {}", port)
              )
            })?;
        }

        config.debug = match (lookup("DEBUG"), lookup("FLASK_ENV"))
        {   (Some(flag), _) => parse_flag(&flag)
          , (None, Some(env)) => env.trim() != "production"
          , (None, None) => false
        };

        config.credentials = CREDENTIAL_VARS
          .iter()
          .filter_map(|var| lookup(*var))
          .map(|key| key.trim().to_string())
          .filter(|key| !key.is_empty())
          .collect();
        debug!("Found {} LLM credentials", config.credentials.len());

        if let Some(base) = lookup("MISTRAL_API_BASE")
        {   config.provider.api_base
              = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("MISTRAL_LARGE_MODEL")
        {   config.provider.large_model = model;
        }
        if let Some(model) = lookup("MISTRAL_SMALL_MODEL")
        {   config.provider.small_model = model;
        }
        if let Some(secs) = lookup("HTTP_TIMEOUT_SECS")
        {   config.provider.timeout_secs
              = parse_number("HTTP_TIMEOUT_SECS", &secs)?;
        }
        if let Some(api) = lookup("WIKI_API_URL")
        {   config.wiki_api = api.trim().to_string();
        }
        if let Some(cap) = lookup("WIKI_CONTENT_CAP")
        {   config.content_cap
              = parse_number("WIKI_CONTENT_CAP", &cap)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error>
    {   if self.credentials.is_empty()
        {   return Err(Error::MissingApiKey(
              format!(
                "Mistral (set at least one of {})",
                CREDENTIAL_VARS.join(", ")
              )
            ));
        }
        if !self.wiki_api.contains("{lang}")
        {   warn!("WIKI_API_URL has no {{lang}}, every language uses {}", self.wiki_api);
        }
        if self.content_cap == 0
        {   warn!("WIKI_CONTENT_CAP is 0, prompts will carry no article text");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.provider.timeout_secs)
    }
}

fn parse_flag(value: &str) -> bool
{   matches!(
      value.trim().to_ascii_lowercase().as_str(),
      "1" | "true" | "yes" | "on"
    )
}

fn parse_number<T: std::str::FromStr>(
  name: &str
, value: &str
) -> Result<T, Error>
{   value.trim().parse().map_err(|_| {
      Error::InvalidConfiguration(
        format!("{} is not a number: {}", name, value)
      )
    })
}
