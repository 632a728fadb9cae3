//! Document-wide bookmark registry
//!
//! Bookmark ids must be unique across the main document, headers, footers
//! and comments, so a single registry is shared by every part of a
//! package.

use std::collections::BTreeMap;

use crate::components::{BookmarkRangeEnd, BookmarkRangeStart};
use crate::error::{DocxError, Result};
use crate::ids::KeyAllocator;

/// Bookmark ids and names in use
#[derive(Debug, Clone, Default)]
pub struct Bookmarks {
    ids: KeyAllocator,
    names: BTreeMap<u32, String>,
}

impl Bookmarks {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id for `name` and return the pair of markers
    pub fn create(&mut self, name: impl Into<String>) -> (BookmarkRangeStart, BookmarkRangeEnd) {
        let id = self.ids.next();
        let name = name.into();
        self.names.insert(id, name.clone());
        (BookmarkRangeStart::new(id, name), BookmarkRangeEnd::new(id))
    }

    /// Record an id found in a parsed part
    pub fn register(&mut self, id: u32, name: &str) -> Result<()> {
        if !self.ids.claim(id) {
            return Err(DocxError::DuplicateBookmark(id));
        }
        self.names.insert(id, name.to_string());
        Ok(())
    }

    /// Name of bookmark `id`
    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Id of the bookmark called `name`
    pub fn find(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(&id, _)| id)
    }

    /// Forget bookmark `id`
    pub fn remove(&mut self, id: u32) -> Option<String> {
        self.ids.release(id);
        self.names.remove(&id)
    }

    /// Number of bookmarks
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no bookmarks
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Bookmarks in id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(&id, name)| (id, name.as_str()))
    }
}
