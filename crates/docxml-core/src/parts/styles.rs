//! The styles part

use std::ops::{Deref, DerefMut};

use crate::content_types::content_type;
use crate::error::Result;
use crate::styles::StyleSheet;
use crate::xml::XmlElement;

/// `word/styles.xml`
///
/// Dereferences to its [`StyleSheet`].
#[derive(Debug, Clone)]
pub struct StylesXml {
    location: String,
    sheet: StyleSheet,
}

impl StylesXml {
    /// Content type of the part
    pub const CONTENT_TYPE: &'static str = content_type::WML_STYLES;

    /// Empty styles part at `location`
    pub fn new(location: &str) -> Self {
        Self::with_sheet(location, StyleSheet::new())
    }

    /// Styles part holding `sheet`
    pub fn with_sheet(location: &str, sheet: StyleSheet) -> Self {
        Self {
            location: location.to_string(),
            sheet,
        }
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The style definitions
    pub fn sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    /// Render `w:styles`
    pub fn to_node(&self) -> XmlElement {
        self.sheet.to_node()
    }

    /// Parse the part
    pub fn parse(location: &str, xml: &[u8]) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        Ok(Self::with_sheet(location, StyleSheet::from_node(&root)))
    }
}

impl Deref for StylesXml {
    type Target = StyleSheet;

    fn deref(&self) -> &StyleSheet {
        &self.sheet
    }
}

impl DerefMut for StylesXml {
    fn deref_mut(&mut self) -> &mut StyleSheet {
        &mut self.sheet
    }
}
