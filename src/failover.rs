//! Failover across credentials and model tiers

use std::time::Duration;

use log::{debug, info, warn};

use crate::error::Error;
use crate::keypool::KeyPool;
use crate::prompt::{ModelHint, Prompt};
use crate::providers::ChatTransport;

/// Primary and fallback model names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTiers
{   pub large: String
  , pub small: String
}

/// Sends a prompt through the pool: one attempt per credential, with a
/// downgrade to the small model inside the attempt on capacity errors.
#[derive(Debug)]
pub struct LlmInvoker<T>
{   transport: T
  , pool: KeyPool
  , tiers: ModelTiers
  , backoff: Duration
}

impl<T: ChatTransport> LlmInvoker<T>
{   pub fn new(
      transport: T
    , pool: KeyPool
    , tiers: ModelTiers
    , backoff: Duration
    ) -> Self
    {   debug!(
          "Creating invoker over {} credentials ({} -> {})",
          pool.size(), tiers.large, tiers.small
        );
        LlmInvoker
        {   transport
          , pool
          , tiers
          , backoff
        }
    }

    pub fn pool(&self) -> &KeyPool
    {   &self.pool
    }

    pub fn transport(&self) -> &T
    {   &self.transport
    }

    pub fn tiers(&self) -> &ModelTiers
    {   &self.tiers
    }

    /// Start on the prompt's hinted tier; only a large-tier start can
    /// downgrade.
    pub async fn invoke(&self, prompt: &Prompt) -> Result<String, Error>
    {   let attempts = self.pool.size();
        let first = prompt.model_hint.model_name(&self.tiers);
        let can_downgrade = prompt.model_hint == ModelHint::Large;
        let mut last = Error::Other("no attempt made".to_string());

        for attempt in 1..=attempts
        {   let credential = self.pool.next_credential();

            let outcome = match self.transport
              .complete(credential, first, &prompt.text, prompt.params)
              .await
            {   Ok(text) => Ok(text)
              , Err(e) if can_downgrade && e.is_capacity() => {
                  info!(
                    "Attempt {}/{}: {} over capacity, retrying on {}",
                    attempt, attempts, first, self.tiers.small
                  );
                  self.transport
                    .complete(
                      credential,
                      &self.tiers.small,
                      &prompt.text,
                      prompt.params
                    )
                    .await
                }
              , Err(e) => Err(e)
            };

            match outcome
            {   Ok(text) => {
                  debug!("Attempt {}/{} succeeded", attempt, attempts);
                  return Ok(text);
                }
              , Err(e) => {
                  warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
                  last = e;
                }
            }

            if attempt < attempts && !self.backoff.is_zero()
            {   tokio::time::sleep(self.backoff).await;
            }
        }

        Err(Error::AllCredentialsFailed(last.to_string()))
    }
}
