use std::time::Duration;

use log::{debug, error, trace};
use serde::Deserialize;

use crate::error::Error;
use crate::request::Language;
use crate::wiki::{Page, PageLookup, WikiSource};

const USER_AGENT: &str
  = concat!("wikisum/", env!("CARGO_PKG_VERSION"), " (summarizer service)");

/// Action API of each language edition; `{lang}` is the edition code.
pub const WIKIPEDIA_API: &str = "https://{lang}.wikipedia.org/w/api.php";

/// Link prefixes that never name an article on a disambiguation page.
const NON_ARTICLE_PREFIXES: [&str; 10] =
  [ "file:", "image:", "category:", "wiktionary:", "wikt:"
  , "fichier:", "catégorie:", "archivo:", "categoría:", "help:"
  ];

// ===== API Types =====

#[derive(Debug, Clone, Deserialize)]
struct QueryResponse<T>
{   query: Option<T>
}

#[derive(Debug, Clone, Deserialize)]
struct ParseResponse
{   parse: Option<ParsedPage>
}

#[derive(Debug, Clone, Deserialize)]
struct ParsedPage
{   #[serde(default)]
    wikitext: String
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PagesQuery
{   #[serde(default)]
    pages: Vec<ApiPage>
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApiPage
{   title: String
  , #[serde(default)]
    missing: bool
  , #[serde(default)]
    invalid: bool
  , #[serde(default)]
    extract: Option<String>
  , #[serde(default)]
    fullurl: Option<String>
  , #[serde(default)]
    pageprops: Option<PageProps>
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PageProps
{   #[serde(default)]
    disambiguation: Option<serde_json::Value>
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchQuery
{   #[serde(default)]
    search: Vec<SearchHit>
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit
{   title: String
}

// ===== MediaWiki Client =====

/// Client for the MediaWiki action API of each language edition.
#[derive(Debug, Clone)]
pub struct MediaWikiClient
{   api_template: String
  , http_client: reqwest::Client
}

impl MediaWikiClient
{   pub fn new(timeout: Duration) -> Result<Self, Error>
    {   Self::with_api(WIKIPEDIA_API, timeout)
    }

    /// `api_template` is the action API URL with `{lang}` in place of the
    /// edition code.
    pub fn with_api(
      api_template: impl Into<String>
    , timeout: Duration
    ) -> Result<Self, Error>
    {   debug!("Creating MediaWikiClient");
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .user_agent(USER_AGENT)
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(MediaWikiClient
        {   api_template: api_template.into()
          , http_client
        })
    }

    fn endpoint(&self, language: Language) -> String
    {   self.api_template.replace("{lang}", language.code())
    }

    async fn call<R>(
      &self
    , language: Language
    , params: &[(&str, &str)]
    ) -> Result<R, Error>
    where R: serde::de::DeserializeOwned
    {   let response = self.http_client
          .get(self.endpoint(language))
          .query(&[("format", "json"), ("formatversion", "2")])
          .query(params)
          .send()
          .await?;

        let status = response.status();
        trace!("MediaWiki response status: {}", status);
        if !status.is_success()
        {   return Err(Error::ApiError(
              format!("Wikipedia returned {}", status)
            ));
        }

        Ok(response.json().await?)
    }

    /// Article links of a disambiguation page, in the order the page
    /// lists them.
    async fn disambiguation_options(
      &self
    , language: Language
    , title: &str
    ) -> Result<Vec<String>, Error>
    {   let response: ParseResponse = self.call(
          language,
          &[ ("action", "parse")
           , ("prop", "wikitext")
           , ("redirects", "1")
           , ("page", title)
           ]
        ).await?;

        Ok(response.parse
          .map(|p| listed_articles(&p.wikitext))
          .unwrap_or_default())
    }
}

/// First article link of every list item, in document order.
fn listed_articles(wikitext: &str) -> Vec<String>
{   let mut titles: Vec<String> = vec![];
    for line in wikitext.lines()
    {   let line = line.trim_start();
        if !line.starts_with('*') && !line.starts_with('#')
        {   continue;
        }
        let first = wiki_links(line).find(|target| is_article(target));
        if let Some(title) = first
        {   if !titles.contains(&title)
            {   titles.push(title);
            }
        }
    }
    titles
}

/// Targets of the `[[target|label]]` links in one line.
fn wiki_links(line: &str) -> impl Iterator<Item = String> + '_
{   line.split("[[").skip(1).filter_map(|chunk| {
      let link = &chunk[..chunk.find("]]")?];
      let target = link.split('|').next()?;
      let target = target.split('#').next()?;
      Some(target.trim().replace('_', " "))
    })
}

fn is_article(target: &str) -> bool
{   let lower = target.to_lowercase();
    !target.is_empty()
      && !target.starts_with(':')
      && !NON_ARTICLE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

impl WikiSource for MediaWikiClient
{   async fn fetch_page(
      &self
    , language: Language
    , title: &str
    ) -> Result<PageLookup, Error>
    {   debug!("Fetching page '{}' ({})", title, language.code());
        let response: QueryResponse<PagesQuery> = self.call(
          language,
          &[ ("action", "query")
           , ("prop", "extracts|info|pageprops")
           , ("explaintext", "1")
           , ("inprop", "url")
           , ("ppprop", "disambiguation")
           , ("redirects", "1")
           , ("titles", title)
           ]
        ).await?;

        let page = match response.query.and_then(|q| q.pages.into_iter().next())
        {   Some(page) => page
          , None => return Ok(PageLookup::Missing)
        };

        if page.missing || page.invalid
        {   return Ok(PageLookup::Missing);
        }

        let ambiguous = page.pageprops
          .as_ref()
          .is_some_and(|p| p.disambiguation.is_some());
        if ambiguous
        {   let options = self
              .disambiguation_options(language, &page.title)
              .await?;
            return Ok(PageLookup::Ambiguous(options));
        }

        let url = page.fullurl.clone().unwrap_or_else(|| {
          format!(
            "https://{}.wikipedia.org/wiki/{}",
            language.code(),
            page.title.replace(' ', "_")
          )
        });

        Ok(PageLookup::Found(Page
        {   title: page.title
          , content: page.extract.unwrap_or_default()
          , url
        }))
    }

    async fn search(
      &self
    , language: Language
    , query: &str
    , limit: usize
    ) -> Result<Vec<String>, Error>
    {   debug!("Searching '{}' ({})", query, language.code());
        let limit = limit.to_string();
        let response: QueryResponse<SearchQuery> = self.call(
          language,
          &[ ("action", "query")
           , ("list", "search")
           , ("srsearch", query)
           , ("srlimit", limit.as_str())
           , ("srprop", "")
           ]
        ).await?;

        Ok(response.query
          .unwrap_or_default()
          .search
          .into_iter()
          .map(|hit| hit.title)
          .collect())
    }
}
