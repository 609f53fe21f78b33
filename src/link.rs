//! Hyperlink pool for OSC 8 link storage.
//!
//! Link ids are packed into the upper bits of a cell's
//! [`TextAttributes`](crate::TextAttributes). Id 0 means "no link"; issued
//! ids start at 1 and stay valid for the pool's lifetime.

use crate::error::{Error, Result};
use crate::style::TextAttributes;
use std::collections::HashMap;

/// Append-only pool of hyperlink URLs.
#[derive(Clone, Debug, Default)]
pub struct LinkPool {
    urls: Vec<Box<str>>,
    index: HashMap<Box<str>, u32>,
}

impl LinkPool {
    /// Create a new empty link pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Link id for `url`, reusing the existing id for a URL seen before.
    ///
    /// Fails with [`Error::LinkPoolExhausted`] once the 24-bit id space is used up.
    pub fn intern(&mut self, url: &str) -> Result<u32> {
        if let Some(&id) = self.index.get(url) {
            return Ok(id);
        }
        let id = u32::try_from(self.urls.len() + 1).map_err(|_| Error::LinkPoolExhausted)?;
        if id > TextAttributes::MAX_LINK_ID {
            return Err(Error::LinkPoolExhausted);
        }
        let url: Box<str> = Box::from(url);
        self.index.insert(url.clone(), id);
        self.urls.push(url);
        Ok(id)
    }

    /// Get the URL for a link ID.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.urls.get((id - 1) as usize).map(|url| &**url)
    }

    /// Number of interned links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Check if pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
