//! Process-lifetime memo of successful responses

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::request::{SummaryRequest, SummaryResponse};

/// 128-bit hex fingerprint of the normalized request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint
{   pub fn of(request: &SummaryRequest) -> Self
    {   let key = format!(
          "{}|{}|{}|{}",
          request.theme().trim().to_lowercase(),
          request.length().as_str(),
          request.language().code(),
          request.mode().as_str()
        );
        let digest = Sha256::digest(key.as_bytes());
        Fingerprint(hex::encode(&digest[..16]))
    }

    pub fn as_str(&self) -> &str
    {   &self.0
    }
}

/// Unbounded map; only successful responses go in.
#[derive(Debug, Default)]
pub struct Memoizer
{   entries: Mutex<HashMap<Fingerprint, SummaryResponse>>
}

impl Memoizer
{   pub fn new() -> Self
    {   Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Fingerprint, SummaryResponse>>
    {   // entries are inserted whole, a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|poisoned| {
          warn!("Memo lock was poisoned, recovering");
          poisoned.into_inner()
        })
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<SummaryResponse>
    {   self.lock().get(fingerprint).cloned()
    }

    /// Last writer wins.
    pub fn put(&self, fingerprint: Fingerprint, response: SummaryResponse)
    {   if !response.success
        {   return;
        }
        debug!("Memoizing {}", fingerprint.as_str());
        self.lock().insert(fingerprint, response);
    }

    pub fn len(&self) -> usize
    {   self.lock().len()
    }

    pub fn is_empty(&self) -> bool
    {   self.len() == 0
    }
}
