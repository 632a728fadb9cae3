//! XML parts without a model
//!
//! Font tables, themes, web settings, notes and the like are carried
//! through unchanged, together with whatever they reference.

use log::warn;

use crate::relationships::Relationships;

/// A known part kept verbatim
#[derive(Debug, Clone)]
pub struct OpaquePart {
    location: String,
    /// Content type for `[Content_Types].xml`
    pub content_type: String,
    /// File contents
    pub data: Vec<u8>,
    /// Parts this one references
    pub relationships: Relationships,
}

impl OpaquePart {
    /// Keep `data` as the part at `location`
    pub fn new(
        location: &str,
        content_type: impl Into<String>,
        data: Vec<u8>,
        relationships: Relationships,
    ) -> Self {
        let content_type = content_type.into();
        warn!("keeping {location} ({content_type}) verbatim");
        Self {
            location: location.to_string(),
            content_type,
            data,
            relationships,
        }
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        &self.location
    }
}
