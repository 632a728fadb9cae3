//! Template loader for DOTX/DOCX templates
//!
//! A template contributes its styles, settings and numbering definitions
//! to new documents; its body is not copied.
//!
//! # Example
//!
//! ```no_run
//! use docxml_core::{Paragraph, Template};
//!
//! let template = Template::load("corporate.dotx")?;
//! template.style("Heading1")?;
//!
//! let mut docx = template.new_document()?;
//! docx.document_mut()?
//!     .push(Paragraph::with_text("Quarterly report").with_style("Heading1"));
//! docx.save("report.docx")?;
//! # Ok::<(), docxml_core::DocxError>(())
//! ```

use std::path::Path;

use log::debug;

use crate::config::PackageConfig;
use crate::docx::Docx;
use crate::error::{DocxError, Result};
use crate::parts::Part;
use crate::relationships::RelationshipType;
use crate::styles::{Style, StyleSheet, StyleType};

/// A Word template (.dotx) wrapper providing template-specific operations
#[derive(Debug)]
pub struct Template {
    docx: Docx,
}

impl Template {
    /// Load a template from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            docx: Docx::open(path)?,
        })
    }

    /// Load a template from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            docx: Docx::from_bytes(bytes)?,
        })
    }

    /// The template package
    pub fn docx(&self) -> &Docx {
        &self.docx
    }

    /// Consume the template and return the package
    pub fn into_docx(self) -> Docx {
        self.docx
    }

    /// The template's style definitions, if it has a styles part
    pub fn styles(&self) -> Option<&StyleSheet> {
        self.docx
            .document()
            .ok()?
            .styles()
            .map(|styles| styles.sheet())
    }

    /// Look up a style the template must define
    pub fn style(&self, style_id: &str) -> Result<&Style> {
        self.styles()
            .ok_or_else(|| DocxError::StyleNotFound(style_id.to_string()))?
            .require(style_id)
    }

    /// Check if a specific style ID exists in the template
    pub fn has_style(&self, style_id: &str) -> bool {
        self.styles().is_some_and(|styles| styles.has(style_id))
    }

    /// Style IDs in document order
    pub fn available_style_ids(&self) -> Vec<String> {
        self.styles()
            .map(|styles| styles.iter().map(|s| s.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Paragraph styles that resolve to a heading level
    pub fn heading_style_ids(&self) -> Vec<String> {
        let Some(styles) = self.styles() else {
            return Vec::new();
        };
        styles
            .of_type(StyleType::Paragraph)
            .filter(|s| styles.heading_level(&s.id).is_some())
            .map(|s| s.id.clone())
            .collect()
    }

    /// Table style IDs
    pub fn table_style_ids(&self) -> Vec<String> {
        self.styles()
            .map(|styles| {
                styles
                    .of_type(StyleType::Table)
                    .map(|s| s.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// New empty document that keeps the template's styles, settings and
    /// numbering
    pub fn new_document(&self) -> Result<Docx> {
        self.new_document_with(PackageConfig::default())
    }

    /// Like [`Template::new_document`], with an explicit configuration
    pub fn new_document_with(&self, config: PackageConfig) -> Result<Docx> {
        let source = self.docx.document()?;
        let mut docx = Docx::with_config(config);
        let relationships = &mut docx.document_mut()?.relationships;

        if let Some(styles) = source.styles() {
            debug!("copying {} template styles", styles.len());
            relationships.add_part(RelationshipType::Styles, Part::Styles(styles.clone()));
        }
        if let Some(settings) = source.settings() {
            relationships.add_part(RelationshipType::Settings, Part::Settings(settings.clone()));
        }
        if let Some(numbering) = source.numbering() {
            relationships.add_part(RelationshipType::Numbering, Part::Numbering(numbering.clone()));
        }
        Ok(docx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::template_package;

    fn template() -> Template {
        Template::from_bytes(&template_package()).unwrap()
    }

    #[test]
    fn test_style_lookup() {
        let template = template();
        assert!(template.has_style("Normal"));
        assert_eq!(template.style("TableGrid").unwrap().style_type, StyleType::Table);
        assert!(matches!(
            template.style("NonExistent"),
            Err(DocxError::StyleNotFound(id)) if id == "NonExistent"
        ));
    }

    #[test]
    fn test_style_id_listings() {
        let template = template();
        assert_eq!(
            template.available_style_ids(),
            vec!["Normal", "Heading1", "Heading2", "TableGrid", "ListBullet"]
        );
        assert_eq!(template.heading_style_ids(), vec!["Heading1", "Heading2"]);
        assert_eq!(template.table_style_ids(), vec!["TableGrid"]);
    }

    #[test]
    fn test_load_from_invalid_bytes() {
        assert!(Template::from_bytes(b"This is not a ZIP file").is_err());
        assert!(Template::from_bytes(&[0x50, 0x4b, 0x03, 0x04, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_new_document_keeps_definitions_not_body() {
        let template = template();
        let docx = template.new_document().unwrap();
        let document = docx.document().unwrap();

        assert_eq!(document.blocks().count(), 0);
        assert_eq!(document.styles().unwrap().len(), 5);
        assert_eq!(document.settings().unwrap().track_revisions, Some(true));
        assert!(document.numbering().unwrap().has(1));
        assert_eq!(
            document.content_type(),
            crate::content_types::content_type::WML_DOCUMENT_MAIN
        );
    }
}
