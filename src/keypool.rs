//! Rotating pool of LLM credentials

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::error::Error;

/// Opaque provider credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential
{   pub fn new(secret: impl Into<String>) -> Self
    {   Credential(secret.into())
    }

    pub fn secret(&self) -> &str
    {   &self.0
    }
}

impl fmt::Debug for Credential
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f, "Credential(****)")
    }
}

/// Ordered credentials plus a cursor that advances on every handout.
#[derive(Debug)]
pub struct KeyPool
{   keys: Vec<Credential>
  , cursor: AtomicU64
}

impl KeyPool
{   pub fn new(keys: Vec<Credential>) -> Result<Self, Error>
    {   if keys.is_empty()
        {   return Err(Error::MissingApiKey(
              "Mistral (empty credential pool)".to_string()
            ));
        }
        debug!("Creating key pool with {} credentials", keys.len());
        Ok(KeyPool
        {   keys
          , cursor: AtomicU64::new(0)
        })
    }

    pub fn from_secrets<I, S>(secrets: I) -> Result<Self, Error>
    where I: IntoIterator<Item = S>
        , S: Into<String>
    {   Self::new(secrets.into_iter().map(Credential::new).collect())
    }

    /// Credential at `cursor mod size`; the cursor moves on.
    pub fn next_credential(&self) -> &Credential
    {   let position = self.cursor.fetch_add(1, Ordering::Relaxed);
        let index = (position % self.keys.len() as u64) as usize;
        debug!("Handing out credential #{}", index);
        &self.keys[index]
    }

    pub fn size(&self) -> usize
    {   self.keys.len()
    }

    pub fn cursor(&self) -> u64
    {   self.cursor.load(Ordering::Relaxed)
    }
}
