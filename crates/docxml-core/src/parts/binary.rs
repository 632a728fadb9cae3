//! Raw binary parts (media, embedded objects, fonts)

use std::fmt;

/// A part stored as bytes
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryPart {
    location: String,
    /// Content type for `[Content_Types].xml`
    pub content_type: String,
    /// File contents
    pub data: Vec<u8>,
}

impl fmt::Debug for BinaryPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryPart")
            .field("location", &self.location)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl BinaryPart {
    /// Part at `location` holding `data`
    pub fn new(location: &str, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            location: location.to_string(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        &self.location
    }
}
