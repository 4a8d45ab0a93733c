//! Orchestrates lookup, prompting, invocation, formatting and memoization

use std::time::Instant;

use log::{debug, error, info};

use crate::config::ServiceConfig;
use crate::error::Error;
use crate::failover::{LlmInvoker, ModelTiers};
use crate::format::format_reply;
use crate::keypool::KeyPool;
use crate::memo::{Fingerprint, Memoizer};
use crate::prompt;
use crate::providers::ChatTransport;
use crate::request::{Source, SummaryRequest, SummaryResponse};
use crate::stats::{Stats, StatsSnapshot};
use crate::wiki::{Locator, WikiSource};

/// Method reported when no article backed the answer.
pub const DIRECT_AI_METHOD: &str = "direct_ai";

/// Owns all process-wide state: key pool cursor, memo and counters.
#[derive(Debug)]
pub struct Summarizer<T, W>
{   invoker: LlmInvoker<T>
  , locator: Locator<W>
  , memo: Memoizer
  , stats: Stats
}

impl<T, W> Summarizer<T, W>
where T: ChatTransport
    , W: WikiSource
{   pub fn new(invoker: LlmInvoker<T>, locator: Locator<W>) -> Self
    {   Summarizer
        {   invoker
          , locator
          , memo: Memoizer::new()
          , stats: Stats::default()
        }
    }

    pub fn from_config(
      config: &ServiceConfig
    , transport: T
    , source: W
    ) -> Result<Self, Error>
    {   let pool = KeyPool::from_secrets(config.credentials.iter().cloned())?;
        let tiers = ModelTiers
        {   large: config.provider.large_model.clone()
          , small: config.provider.small_model.clone()
        };
        let invoker = LlmInvoker::new(
          transport,
          pool,
          tiers,
          config.failover.backoff()
        );
        Ok(Self::new(invoker, Locator::new(source, config.content_cap)))
    }

    pub fn key_pool(&self) -> &KeyPool
    {   self.invoker.pool()
    }

    pub fn invoker(&self) -> &LlmInvoker<T>
    {   &self.invoker
    }

    pub fn locator(&self) -> &Locator<W>
    {   &self.locator
    }

    pub fn memo(&self) -> &Memoizer
    {   &self.memo
    }

    pub fn stats(&self) -> StatsSnapshot
    {   self.stats.snapshot()
    }

    /// Run one validated request. Terminal LLM failures come back as
    /// `Err` and are never memoized.
    pub async fn process(
      &self
    , request: &SummaryRequest
    ) -> Result<SummaryResponse, Error>
    {   self.stats.record_request();
        let started = Instant::now();

        let fingerprint = Fingerprint::of(request);
        if let Some(cached) = self.memo.get(&fingerprint)
        {   info!("Memo hit for '{}'", request.theme());
            self.stats.record_cache_hit();
            return Ok(cached);
        }

        let located = self.locator
          .locate(request.theme(), request.language())
          .await;

        let response = match located
        {   Some(article) => {
              debug!("Summarizing article '{}'", article.title);
              let prompt = prompt::summary_prompt(request, &article);
              let reply = self.invoker.invoke(&prompt).await.map_err(|e| {
                error!("Summary of '{}' failed: {}", article.title, e);
                e
              })?;
              self.stats.record_wikipedia();

              SummaryResponse
              {   success: true
                , title: article.title
                , summary_html: format_reply(&reply)
                , url: Some(article.url)
                , source: Source::Wikipedia
                , method: article.method.to_string()
                , processing_time_seconds: elapsed_seconds(started)
                , length: request.length()
                , length_mode: request.length().wire_token().to_string()
                , language: request.language()
                , mode: request.mode()
              }
            }
          , None => {
              debug!("Answering '{}' without an article", request.theme());
              let prompt = prompt::direct_prompt(request);
              let reply = self.invoker.invoke(&prompt).await.map_err(|e| {
                error!("Direct answer for '{}' failed: {}", request.theme(), e);
                e
              })?;
              self.stats.record_llm_only();

              SummaryResponse
              {   success: true
                , title: request.theme().to_string()
                , summary_html: format_reply(&reply)
                , url: None
                , source: Source::LlmOnly
                , method: DIRECT_AI_METHOD.to_string()
                , processing_time_seconds: elapsed_seconds(started)
                , length: request.length()
                , length_mode: request.length().wire_token().to_string()
                , language: request.language()
                , mode: request.mode()
              }
            }
        };

        info!(
          "Answered '{}' from {:?} in {:.2}s",
          response.title, response.source, response.processing_time_seconds
        );
        self.memo.put(fingerprint, response.clone());
        Ok(response)
    }
}

fn elapsed_seconds(started: Instant) -> f64
{   (started.elapsed().as_secs_f64() * 100.0).round() / 100.0
}
