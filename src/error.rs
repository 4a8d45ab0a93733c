use std::fmt;

/// Custom error type for wikisum operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Request rejected before any work was done (400)
    Validation(String)
  , /// No credential configured for the LLM provider
    MissingApiKey(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// HTTP transport error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Rate limit exceeded (HTTP 429)
    RateLimitExceeded
  , /// Provider reported the model is over capacity
    CapacityExceeded(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Timeout error
    Timeout
  , /// Every credential and model tier failed
    AllCredentialsFailed(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Errors that justify retrying the same credential on the
    /// smaller model tier.
    pub fn is_capacity(&self) -> bool
    {   matches!(
          self,
          Error::RateLimitExceeded | Error::CapacityExceeded(_)
        )
    }

    pub fn is_validation(&self) -> bool
    {   matches!(self, Error::Validation(_))
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Validation(msg) => {
              write!(f, "{}", msg)
            }
          , Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::CapacityExceeded(msg) => {
              write!(f, "Model capacity exceeded: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::AllCredentialsFailed(last) => {
              write!(f, "All credentials failed: {}", last)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::ParseError(e.to_string())
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}
