//! Request and response types for the summarizer

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Target length bucket of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Length
{   Short
  , #[default]
    Medium
  , Long
}

impl Length
{   /// Parse the French wire token (`court`, `moyen`, `long`).
    pub fn from_wire(token: &str) -> Option<Self>
    {   match token.trim().to_ascii_lowercase().as_str()
        {   "court" | "short" => Some(Length::Short)
          , "moyen" | "medium" => Some(Length::Medium)
          , "long" => Some(Length::Long)
          , _ => None
        }
    }

    pub fn wire_token(self) -> &'static str
    {   match self
        {   Length::Short => "court"
          , Length::Medium => "moyen"
          , Length::Long => "long"
        }
    }

    pub fn as_str(self) -> &'static str
    {   match self
        {   Length::Short => "short"
          , Length::Medium => "medium"
          , Length::Long => "long"
        }
    }

    /// Inclusive word range the prompt asks for.
    pub fn word_range(self) -> (u32, u32)
    {   match self
        {   Length::Short => (150, 200)
          , Length::Medium => (250, 350)
          , Length::Long => (400, 500)
        }
    }

    /// Generation budget sized to the word range.
    pub fn max_tokens(self) -> usize
    {   match self
        {   Length::Short => 400
          , Length::Medium => 600
          , Length::Long => 800
        }
    }
}

/// Output language, doubling as the Wikipedia edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language
{   #[default]
    En
  , Fr
  , Es
}

impl Language
{   pub fn from_code(code: &str) -> Option<Self>
    {   match code.trim().to_ascii_lowercase().as_str()
        {   "en" => Some(Language::En)
          , "fr" => Some(Language::Fr)
          , "es" => Some(Language::Es)
          , _ => None
        }
    }

    pub fn code(self) -> &'static str
    {   match self
        {   Language::En => "en"
          , Language::Fr => "fr"
          , Language::Es => "es"
        }
    }

    /// English name used in the language instruction.
    pub fn name(self) -> &'static str
    {   match self
        {   Language::En => "English"
          , Language::Fr => "French"
          , Language::Es => "Spanish"
        }
    }
}

/// Thematic steering for the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode
{   #[default]
    General
  , Historical
  , Scientific
  , Biographical
  , Educational
  , Cultural
  , KeyFacts
}

impl Mode
{   pub const ALL: [Mode; 7] = [
      Mode::General
    , Mode::Historical
    , Mode::Scientific
    , Mode::Biographical
    , Mode::Educational
    , Mode::Cultural
    , Mode::KeyFacts
    ];

    pub fn from_name(name: &str) -> Option<Self>
    {   let name = name.trim().to_ascii_lowercase();
        Mode::ALL.into_iter().find(|m| m.as_str() == name)
    }

    pub fn as_str(self) -> &'static str
    {   match self
        {   Mode::General => "general"
          , Mode::Historical => "historical"
          , Mode::Scientific => "scientific"
          , Mode::Biographical => "biographical"
          , Mode::Educational => "educational"
          , Mode::Cultural => "cultural"
          , Mode::KeyFacts => "key_facts"
        }
    }
}

/// A validated summarization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest
{   theme: String
  , length: Length
  , language: Language
  , mode: Mode
}

impl SummaryRequest
{   /// Minimum theme length, in characters, after trimming.
    pub const MIN_THEME_CHARS: usize = 2;

    pub fn new(
      theme: &str
    , length: Length
    , language: Language
    , mode: Mode
    ) -> Result<Self, Error>
    {   let theme = theme.trim();
        if theme.chars().count() < Self::MIN_THEME_CHARS
        {   return Err(Error::Validation(
              "Theme must contain at least 2 characters".to_string()
            ));
        }
        Ok(SummaryRequest
        {   theme: theme.to_string()
          , length
          , language
          , mode
        })
    }

    /// Request with default length, language and mode.
    pub fn with_theme(theme: &str) -> Result<Self, Error>
    {   Self::new(theme, Length::default(), Language::default(), Mode::default())
    }

    pub fn theme(&self) -> &str
    {   &self.theme
    }

    pub fn length(&self) -> Length
    {   self.length
    }

    pub fn language(&self) -> Language
    {   self.language
    }

    pub fn mode(&self) -> Mode
    {   self.mode
    }
}

/// Where the summary text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source
{   Wikipedia
  , LlmOnly
}

/// Successful pipeline result, also the memoized value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse
{   pub success: bool
  , pub title: String
  , pub summary_html: String
  , pub url: Option<String>
  , pub source: Source
  , pub method: String
  , pub processing_time_seconds: f64
  , pub length: Length
  , pub length_mode: String
  , pub language: Language
  , pub mode: Mode
}

/// Failure body returned by the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse
{   pub success: bool
  , pub error: String
}

impl From<&Error> for ErrorResponse
{   fn from(e: &Error) -> Self
    {   ErrorResponse
        {   success: false
          , error: e.to_string()
        }
    }
}
