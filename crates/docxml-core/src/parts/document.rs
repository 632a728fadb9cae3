//! The main document part

use log::debug;

use crate::bookmarks::Bookmarks;
use crate::component::{Ancestry, Component, LinkContext, ParseContext, RenderContext};
use crate::components::{Node, Section};
use crate::content_types::content_type;
use crate::error::{DocxError, Result};
use crate::parts::{CommentsXml, HeaderFooterXml, NumberingXml, Part, SettingsXml, StylesXml};
use crate::registry::ComponentRegistry;
use crate::relationships::{RelationshipType, Relationships};
use crate::xml::XmlElement;

/// `word/document.xml`
///
/// Owns the relationships to every other WordprocessingML part. Styles,
/// settings, numbering and comments are created on first mutable access
/// and left out of the package while empty.
#[derive(Debug, Clone)]
pub struct DocumentXml {
    location: String,
    content_type: String,
    /// Styles, settings, numbering, comments, headers, footers and media
    pub relationships: Relationships,
    /// Body content, split at section breaks
    pub sections: Vec<Section>,
    /// Bookmarks of the whole package
    pub bookmarks: Bookmarks,
}

impl DocumentXml {
    /// Empty document at `location`
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            content_type: content_type::WML_DOCUMENT_MAIN.to_string(),
            relationships: Relationships::new(location),
            sections: vec![Section::new()],
            bookmarks: Bookmarks::new(),
        }
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Document or template main content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Set the main content type, e.g. to save as a template
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// The last section, where new content goes
    pub fn body_mut(&mut self) -> &mut Section {
        if self.sections.is_empty() {
            self.sections.push(Section::new());
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// Append block content to the last section
    pub fn push(&mut self, child: impl Into<Node>) {
        self.body_mut().push(child);
    }

    /// Every block of every section, in order
    pub fn blocks(&self) -> impl Iterator<Item = &Node> {
        self.sections.iter().flat_map(|s| s.children.iter())
    }

    /// Styles part, if the document has one
    pub fn styles(&self) -> Option<&StylesXml> {
        self.relationships.get::<StylesXml>()
    }

    /// Styles part, created if missing
    pub fn styles_mut(&mut self) -> Result<&mut StylesXml> {
        self.relationships.ensure(StylesXml::new)
    }

    /// Settings part, if the document has one
    pub fn settings(&self) -> Option<&SettingsXml> {
        self.relationships.get::<SettingsXml>()
    }

    /// Settings part, created if missing
    pub fn settings_mut(&mut self) -> Result<&mut SettingsXml> {
        self.relationships.ensure(SettingsXml::new)
    }

    /// Numbering part, if the document has one
    pub fn numbering(&self) -> Option<&NumberingXml> {
        self.relationships.get::<NumberingXml>()
    }

    /// Numbering part, created if missing
    pub fn numbering_mut(&mut self) -> Result<&mut NumberingXml> {
        self.relationships.ensure(NumberingXml::new)
    }

    /// Comments part, if the document has one
    pub fn comments(&self) -> Option<&CommentsXml> {
        self.relationships.get::<CommentsXml>()
    }

    /// Comments part, created if missing
    pub fn comments_mut(&mut self) -> Result<&mut CommentsXml> {
        self.relationships.ensure(CommentsXml::new)
    }

    /// Header and footer parts already linked from sections
    pub fn headers_and_footers(&self) -> impl Iterator<Item = &HeaderFooterXml> {
        self.relationships
            .filter_instances(|meta| {
                matches!(
                    meta.rel_type,
                    RelationshipType::Header | RelationshipType::Footer
                )
            })
            .filter_map(|part| match part {
                Part::HeaderFooter(part) => Some(part),
                _ => None,
            })
    }

    /// Register the relationships the body needs
    pub(crate) fn link(&mut self, media_directory: &str) -> Result<()> {
        let mut cx = LinkContext::new(&mut self.relationships, media_directory);
        for section in &mut self.sections {
            section.ensure_relationships(&mut cx)?;
        }
        cx.finish();
        Ok(())
    }

    /// Render `w:document`
    pub fn to_node(&self, cx: &mut RenderContext) -> Result<XmlElement> {
        let mut body = XmlElement::new("w:body");
        let fallback = [Section::new()];
        let sections = if self.sections.is_empty() {
            &fallback[..]
        } else {
            &self.sections[..]
        };
        let last = sections.len() - 1;
        for (index, section) in sections.iter().enumerate() {
            body.children
                .extend(section.render_body(cx, &Ancestry::root(), index == last)?);
        }
        Ok(XmlElement::new("w:document").with_child(body))
    }

    /// Parse the part
    ///
    /// Bookmarks found in the body are registered in `bookmarks`; the
    /// caller decides which registry the document finally keeps.
    pub fn parse(
        location: &str,
        content_type: &str,
        xml: &[u8],
        relationships: Relationships,
        registry: &ComponentRegistry,
        bookmarks: &mut Bookmarks,
    ) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        if !root.is("w:document") {
            return Err(DocxError::InvalidStructure(format!(
                "{location} has root {}, expected w:document",
                root.name
            )));
        }
        let sections = match root.child("w:body") {
            Some(body) => {
                let mut cx = ParseContext {
                    registry,
                    relationships: &relationships,
                    bookmarks,
                };
                Section::split_body(body, &mut cx)?
            }
            None => {
                debug!("{location} has no w:body");
                vec![Section::new()]
            }
        };

        Ok(Self {
            location: location.to_string(),
            content_type: content_type.to_string(),
            relationships,
            sections,
            bookmarks: Bookmarks::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Comment, Image, Paragraph};
    use crate::properties::{HeaderFooterKind, HeaderFooterRef};
    use crate::test_utils::tiny_png;

    fn image_mut(document: &mut DocumentXml, index: usize) -> &mut Image {
        match &mut document.sections[0].children[index] {
            Node::Paragraph(paragraph) => match &mut paragraph.children[0] {
                Node::Image(image) => image,
                other => panic!("expected an image, got {other:?}"),
            },
            other => panic!("expected a paragraph, got {other:?}"),
        }
    }

    fn reparse(document: &DocumentXml, cx: &mut RenderContext) -> DocumentXml {
        let xml = document.to_node(cx).unwrap().to_xml_document().unwrap();
        DocumentXml::parse(
            document.location(),
            document.content_type(),
            &xml,
            document.relationships.clone(),
            &ComponentRegistry::standard(),
            &mut Bookmarks::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_body() {
        let mut document = DocumentXml::new("word/document.xml");
        document.push(Paragraph::with_text("hello"));
        document.sections.push(Section::new().with_child(Paragraph::with_text("second")));

        let parsed = reparse(&document, &mut RenderContext::new());
        assert_eq!(parsed.sections, document.sections);
        assert_eq!(parsed.blocks().next().unwrap().text(), "hello");
    }

    #[test]
    fn test_empty_sections_still_render_body() {
        let mut document = DocumentXml::new("word/document.xml");
        document.sections.clear();
        let node = document.to_node(&mut RenderContext::new()).unwrap();
        let body = node.child("w:body").unwrap();
        assert!(body.child("w:sectPr").is_some());
    }

    #[test]
    fn test_singleton_parts_are_lazy() {
        let mut document = DocumentXml::new("word/document.xml");
        assert!(document.styles().is_none());
        document.styles_mut().unwrap();
        document.styles_mut().unwrap();
        assert!(document.styles().is_some());
        assert_eq!(document.relationships.len(), 1);
        assert_eq!(document.styles().unwrap().location(), "word/styles.xml");
    }

    #[test]
    fn test_link_creates_header_parts() {
        let mut document = DocumentXml::new("word/document.xml");
        document.body_mut().props.headers.default =
            Some(HeaderFooterRef::Content(vec![Paragraph::with_text("Top").into()]));
        document.link("media").unwrap();

        let headers: Vec<_> = document.headers_and_footers().collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].kind(), HeaderFooterKind::Header);
        assert_eq!(headers[0].location(), "word/header1.xml");
        assert!(matches!(
            document.sections[0].props.headers.default,
            Some(HeaderFooterRef::Linked(_))
        ));
    }

    #[test]
    fn test_relinked_image_drops_old_media() {
        let mut document = DocumentXml::new("word/document.xml");
        document.push(Paragraph::new().with_child(Image::from_bytes(tiny_png())));
        document.link("media").unwrap();
        let old = image_mut(&mut document, 0).relationship.clone().unwrap();

        let mut edited = tiny_png();
        edited.push(0);
        image_mut(&mut document, 0).data = edited.clone();
        document.link("media").unwrap();

        let new = image_mut(&mut document, 0).relationship.clone().unwrap();
        assert_ne!(new, old);
        assert!(document.relationships.meta(&old).is_none());
        assert_eq!(document.relationships.len(), 1);
        assert_eq!(document.relationships.binary_data(&new), Some(edited.as_slice()));
    }

    #[test]
    fn test_shared_media_outlives_one_relink() {
        let mut document = DocumentXml::new("word/document.xml");
        document.push(Paragraph::new().with_child(Image::from_bytes(tiny_png())));
        document.push(Paragraph::new().with_child(Image::from_bytes(tiny_png())));
        document.link("media").unwrap();
        let shared = image_mut(&mut document, 1).relationship.clone().unwrap();

        let mut edited = tiny_png();
        edited.push(0);
        image_mut(&mut document, 0).data = edited;
        document.link("media").unwrap();

        assert_eq!(image_mut(&mut document, 1).relationship.as_deref(), Some(shared.as_str()));
        assert!(document.relationships.binary_data(&shared).is_some());
        assert_eq!(document.relationships.len(), 2);
    }

    #[test]
    fn test_comment_reference_needs_comment() {
        let mut document = DocumentXml::new("word/document.xml");
        document.push(Paragraph::new().with_child(Comment::new(3)));
        assert!(matches!(
            document.to_node(&mut RenderContext::new()),
            Err(DocxError::UnknownComment(3))
        ));
        assert!(document.to_node(&mut RenderContext::with_comments([3])).is_ok());
    }

    #[test]
    fn test_wrong_root_fails() {
        let xml = br#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        let result = DocumentXml::parse(
            "word/document.xml",
            content_type::WML_DOCUMENT_MAIN,
            xml,
            Relationships::new("word/document.xml"),
            &ComponentRegistry::standard(),
            &mut Bookmarks::new(),
        );
        assert!(matches!(result, Err(DocxError::InvalidStructure(_))));
    }
}
