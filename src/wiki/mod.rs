//! Wikipedia lookup: direct page, disambiguation, then search suggestions

use std::fmt;
use std::future::Future;

use log::{debug, info, warn};

use crate::error::Error;
use crate::request::Language;

pub mod mediawiki;

pub use mediawiki::MediaWikiClient;

/// How many search candidates the suggestion step tries.
pub const SUGGESTION_LIMIT: usize = 3;

/// A page as returned by the source, before truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page
{   pub title: String
  , pub content: String
  , pub url: String
}

/// Result of looking a title up without auto-suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLookup
{   Found(Page)
  , /// Disambiguation page; candidate titles in page order
    Ambiguous(Vec<String>)
  , Missing
}

/// Trace of how an article was located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupMethod
{   Direct
  , Disambiguation
  , Suggestion(String)
}

impl fmt::Display for LookupMethod
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   LookupMethod::Direct => write!(f, "direct")
          , LookupMethod::Disambiguation => write!(f, "disambiguation")
          , LookupMethod::Suggestion(query) => {
              write!(f, "suggestion:{}", query)
            }
        }
    }
}

/// Located article, body already truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article
{   pub title: String
  , pub content: String
  , pub url: String
  , pub method: LookupMethod
}

/// Backend able to fetch pages and run a title search.
pub trait WikiSource: Send + Sync
{   fn fetch_page(
      &self
    , language: Language
    , title: &str
    ) -> impl Future<Output = Result<PageLookup, Error>> + Send;

    fn search(
      &self
    , language: Language
    , query: &str
    , limit: usize
    ) -> impl Future<Output = Result<Vec<String>, Error>> + Send;
}

/// Runs the lookup cascade against a [`WikiSource`].
#[derive(Debug)]
pub struct Locator<W>
{   source: W
  , content_cap: usize
}

impl<W: WikiSource> Locator<W>
{   pub fn new(source: W, content_cap: usize) -> Self
    {   Locator
        {   source
          , content_cap
        }
    }

    pub fn source(&self) -> &W
    {   &self.source
    }

    /// Never fails: transport errors only skip the current step.
    pub async fn locate(
      &self
    , theme: &str
    , language: Language
    ) -> Option<Article>
    {   let theme = theme.trim();
        debug!("Locating '{}' on {}.wikipedia.org", theme, language.code());

        match self.source.fetch_page(language, theme).await
        {   Ok(PageLookup::Found(page)) => {
              return Some(self.article(page, LookupMethod::Direct));
            }
          , Ok(PageLookup::Ambiguous(options)) => {
              if let Some(first) = options.first()
              {   info!("'{}' is ambiguous, trying '{}'", theme, first);
                  if let Some(page) = self.resolve(language, first).await
                  {   return Some(
                        self.article(page, LookupMethod::Disambiguation)
                      );
                  }
              }
            }
          , Ok(PageLookup::Missing) => {
              debug!("No page titled '{}'", theme);
            }
          , Err(e) => {
              warn!("Direct lookup of '{}' failed: {}", theme, e);
            }
        }

        let candidates = match self.source
          .search(language, theme, SUGGESTION_LIMIT)
          .await
        {   Ok(candidates) => candidates
          , Err(e) => {
              warn!("Search for '{}' failed: {}", theme, e);
              return None;
            }
        };

        for candidate in candidates.into_iter().take(SUGGESTION_LIMIT)
        {   if let Some(page) = self.resolve(language, &candidate).await
            {   info!("'{}' resolved through suggestion '{}'", theme, candidate);
                return Some(
                  self.article(page, LookupMethod::Suggestion(candidate))
                );
            }
        }

        info!("No Wikipedia article for '{}'", theme);
        None
    }

    async fn resolve(&self, language: Language, title: &str) -> Option<Page>
    {   match self.source.fetch_page(language, title).await
        {   Ok(PageLookup::Found(page)) => Some(page)
          , Ok(_) => None
          , Err(e) => {
              warn!("Lookup of '{}' failed: {}", title, e);
              None
            }
        }
    }

    fn article(&self, page: Page, method: LookupMethod) -> Article
    {   Article
        {   title: page.title
          , content: truncate_chars(&page.content, self.content_cap)
          , url: page.url
          , method
        }
    }
}

/// First `cap` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, cap: usize) -> String
{   match text.char_indices().nth(cap)
    {   Some((end, _)) => text[..end].to_string()
      , None => text.to_string()
    }
}
