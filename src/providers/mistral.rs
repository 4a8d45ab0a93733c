use std::time::Duration;

use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::keypool::Credential;
use crate::providers::{ChatTransport, GenerationParams};

pub const MISTRAL_API_BASE: &str
  = "https://api.mistral.ai/v1";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct MistralChatResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , pub finish_reason: Option<String>
}

// ===== Mistral Client =====

/// Chat completions client. Credentials are supplied per call so the
/// failover loop can rotate them.
#[derive(Debug, Clone)]
pub struct MistralClient
{   api_base: String
  , http_client: reqwest::Client
}

impl MistralClient
{   /// Create a client with a per-call wall-clock timeout
    pub fn new(
      api_base: impl Into<String>
    , timeout: Duration
    ) -> Result<Self, Error>
    {   debug!("Creating MistralClient");
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(MistralClient
        {   api_base: api_base.into()
          , http_client
        })
    }

    async fn send_prompt(
      &self
    , credential: &Credential
    , model: &str
    , prompt: &str
    , params: GenerationParams
    ) -> Result<String, Error>
    {   debug!("Handling send_prompt for: {}", model);

        let request = MistralChatRequest
        {   model: model.to_string()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.to_string()
              }
            ]
          , max_tokens: Some(params.max_tokens)
          , temperature: Some(params.temperature)
          , stream: Some(false)
        };

        trace!("Mistral request: {:?}", request);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .bearer_auth(credential.secret())
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            warn!("HTTP error: {}", e);
            Error::from(e)
          })?;

        let status = response.status();
        trace!("Mistral response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            warn!("Mistral API error {}: {}", status, error_text);
            return Err(classify_failure(status.as_u16(), error_text));
        }

        let chat_response: MistralChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            Error::ParseError(e.to_string())
          })?;

        chat_response.choices.into_iter().next()
          .map(|c| {
            if c.finish_reason.as_deref() == Some("length")
            {   warn!("{} stopped at max_tokens ({})", model, params.max_tokens);
            }
            c.message.content
          })
          .ok_or_else(|| {
            error!("No choices in response");
            Error::NoChoicesInResponse
          })
    }
}

impl ChatTransport for MistralClient
{   async fn complete(
      &self
    , credential: &Credential
    , model: &str
    , prompt: &str
    , params: GenerationParams
    ) -> Result<String, Error>
    {   self.send_prompt(credential, model, prompt, params).await
    }
}

/// Map a non-success status and body to an error, separating the
/// capacity family (which downgrades the model) from the rest.
pub fn classify_failure(status: u16, body: String) -> Error
{   if status == 429
    {   return Error::RateLimitExceeded;
    }
    if body.to_ascii_lowercase().contains("capacity")
    {   return Error::CapacityExceeded(body);
    }
    Error::ApiError(format!("Mistral error {}: {}", status, body))
}
