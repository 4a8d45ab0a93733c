#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use wikisum::config::DEFAULT_CONTENT_CAP;
use wikisum::error::Error;
use wikisum::failover::{LlmInvoker, ModelTiers};
use wikisum::keypool::{Credential, KeyPool};
use wikisum::pipeline::Summarizer;
use wikisum::providers::{ChatTransport, GenerationParams};
use wikisum::request::Language;
use wikisum::wiki::{Locator, Page, PageLookup, WikiSource};

pub const LARGE: &str = "large-model";
pub const SMALL: &str = "small-model";

pub fn tiers() -> ModelTiers
{   ModelTiers
    {   large: LARGE.to_string()
      , small: SMALL.to_string()
    }
}

// ===== Scripted LLM =====

#[derive(Debug, Clone, PartialEq)]
pub struct Call
{   pub credential: String
  , pub model: String
  , pub prompt: String
  , pub params: GenerationParams
}

type Responder
  = Box<dyn Fn(&str, &str) -> Result<String, Error> + Send + Sync>;

/// Answers every call through `responder(credential, model)` and
/// records what was asked.
pub struct ScriptedTransport
{   calls: Mutex<Vec<Call>>
  , responder: Responder
}

impl ScriptedTransport
{   pub fn new<F>(responder: F) -> Self
    where F: Fn(&str, &str) -> Result<String, Error> + Send + Sync + 'static
    {   ScriptedTransport
        {   calls: Mutex::new(vec![])
          , responder: Box::new(responder)
        }
    }

    pub fn replying(text: &'static str) -> Self
    {   Self::new(move |_, _| Ok(text.to_string()))
    }

    pub fn calls(&self) -> Vec<Call>
    {   self.calls.lock().unwrap().clone()
    }
}

impl ChatTransport for ScriptedTransport
{   async fn complete(
      &self
    , credential: &Credential
    , model: &str
    , prompt: &str
    , params: GenerationParams
    ) -> Result<String, Error>
    {   self.calls.lock().unwrap().push(Call
        {   credential: credential.secret().to_string()
          , model: model.to_string()
          , prompt: prompt.to_string()
          , params
        });
        (self.responder)(credential.secret(), model)
    }
}

// ===== Fake Wikipedia =====

#[derive(Default)]
pub struct FakeWiki
{   pages: HashMap<String, PageLookup>
  , searches: HashMap<String, Vec<String>>
  , failing_fetches: HashSet<String>
  , failing_searches: HashSet<String>
  , lookups: Mutex<Vec<(Language, String)>>
}

impl FakeWiki
{   pub fn new() -> Self
    {   Self::default()
    }

    /// `key` resolves to a page titled `title`.
    pub fn with_page(mut self, key: &str, title: &str, content: &str) -> Self
    {   let page = Page
        {   title: title.to_string()
          , content: content.to_string()
          , url: format!(
              "https://en.wikipedia.org/wiki/{}",
              title.replace(' ', "_")
            )
        };
        self.pages.insert(key.to_string(), PageLookup::Found(page));
        self
    }

    pub fn with_ambiguous(mut self, key: &str, options: &[&str]) -> Self
    {   let options = options.iter().map(|o| o.to_string()).collect();
        self.pages.insert(key.to_string(), PageLookup::Ambiguous(options));
        self
    }

    pub fn with_search(mut self, query: &str, results: &[&str]) -> Self
    {   let results = results.iter().map(|r| r.to_string()).collect();
        self.searches.insert(query.to_string(), results);
        self
    }

    /// Fetching the page `title` fails with a transport error.
    pub fn with_fetch_failure(mut self, title: &str) -> Self
    {   self.failing_fetches.insert(title.to_string());
        self
    }

    /// Searching for `query` times out.
    pub fn with_search_failure(mut self, query: &str) -> Self
    {   self.failing_searches.insert(query.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<(Language, String)>
    {   self.lookups.lock().unwrap().clone()
    }
}

impl WikiSource for FakeWiki
{   async fn fetch_page(
      &self
    , language: Language
    , title: &str
    ) -> Result<PageLookup, Error>
    {   self.lookups.lock().unwrap().push((language, title.to_string()));
        if self.failing_fetches.contains(title)
        {   return Err(Error::HttpError("connection reset".to_string()));
        }
        Ok(self.pages.get(title).cloned().unwrap_or(PageLookup::Missing))
    }

    async fn search(
      &self
    , _language: Language
    , query: &str
    , limit: usize
    ) -> Result<Vec<String>, Error>
    {   if self.failing_searches.contains(query)
        {   return Err(Error::Timeout);
        }
        Ok(self.searches
          .get(query)
          .map(|r| r.iter().take(limit).cloned().collect())
          .unwrap_or_default())
    }
}

pub fn summarizer(
  wiki: FakeWiki
, transport: ScriptedTransport
, keys: &[&str]
, backoff: Duration
) -> Summarizer<ScriptedTransport, FakeWiki>
{   let pool = KeyPool::from_secrets(keys.iter().copied()).unwrap();
    let invoker = LlmInvoker::new(transport, pool, tiers(), backoff);
    Summarizer::new(invoker, Locator::new(wiki, DEFAULT_CONTENT_CAP))
}

pub fn einstein_wiki() -> FakeWiki
{   FakeWiki::new().with_page(
      "Einstein",
      "Albert Einstein",
      "Albert Einstein was a German-born theoretical physicist."
    )
}
