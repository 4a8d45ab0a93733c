//! LLM provider implementations

use std::future::Future;

use crate::error::Error;
use crate::keypool::Credential;

pub mod mistral;

// Re-export for convenience
pub use mistral::MistralClient;

/// Sampling parameters sent with every completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams
{   pub temperature: f32
  , pub max_tokens: usize
}

impl Default for GenerationParams
{   fn default() -> Self
    {   GenerationParams
        {   temperature: 0.3
          , max_tokens: 600
        }
    }
}

/// A single-shot chat completion against one credential and model.
pub trait ChatTransport: Send + Sync
{   fn complete(
      &self
    , credential: &Credential
    , model: &str
    , prompt: &str
    , params: GenerationParams
    ) -> impl Future<Output = Result<String, Error>> + Send;
}
