//! Request counters exposed on `/api/stats`

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct Stats
{   requests: AtomicU64
  , cache_hits: AtomicU64
  , wikipedia_success: AtomicU64
  , llm_only: AtomicU64
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot
{   pub requests: u64
  , pub cache_hits: u64
  , pub wikipedia_success: u64
  , /// Direct answers; the wire name predates provider-neutral naming.
    #[serde(rename = "mistral_only")]
    pub llm_only: u64
}

impl Stats
{   pub fn record_request(&self)
    {   self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self)
    {   self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wikipedia(&self)
    {   self.wikipedia_success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_llm_only(&self)
    {   self.llm_only.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot
    {   StatsSnapshot
        {   requests: self.requests.load(Ordering::Relaxed)
          , cache_hits: self.cache_hits.load(Ordering::Relaxed)
          , wikipedia_success: self.wikipedia_success.load(Ordering::Relaxed)
          , llm_only: self.llm_only.load(Ordering::Relaxed)
        }
    }
}
