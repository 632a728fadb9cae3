//! Header and footer parts

use crate::bookmarks::Bookmarks;
use crate::component::{
    check_children, link_children, render_children, Ancestry, LinkContext, ParseContext,
    RenderContext,
};
use crate::components::Node;
use crate::content_types::content_type;
use crate::error::{DocxError, Result};
use crate::properties::HeaderFooterKind;
use crate::registry::ComponentRegistry;
use crate::relationships::Relationships;
use crate::xml::XmlElement;

/// `word/header{N}.xml` or `word/footer{N}.xml`
#[derive(Debug, Clone)]
pub struct HeaderFooterXml {
    kind: HeaderFooterKind,
    location: String,
    /// Media and hyperlinks used by the content
    pub relationships: Relationships,
    /// Block-level content
    pub children: Vec<Node>,
}

impl HeaderFooterXml {
    /// Legal child kinds
    pub const CHILDREN: &'static [&'static str] =
        &["Paragraph", "Table", "BookmarkRangeStart", "BookmarkRangeEnd"];

    /// Header or footer holding `children`
    pub fn new(kind: HeaderFooterKind, location: impl Into<String>, children: Vec<Node>) -> Self {
        let location = location.into();
        Self {
            kind,
            relationships: Relationships::new(&location),
            location,
            children,
        }
    }

    /// Header or footer
    pub fn kind(&self) -> HeaderFooterKind {
        self.kind
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Content type of the part
    pub fn content_type(&self) -> &'static str {
        match self.kind {
            HeaderFooterKind::Header => content_type::WML_HEADER,
            HeaderFooterKind::Footer => content_type::WML_FOOTER,
        }
    }

    pub(crate) fn link(&mut self, media_directory: &str) -> Result<()> {
        let mut cx = LinkContext::new(&mut self.relationships, media_directory);
        link_children(&mut self.children, &mut cx)?;
        cx.finish();
        Ok(())
    }

    /// Render `w:hdr` or `w:ftr`
    pub fn to_node(&self, cx: &mut RenderContext) -> Result<XmlElement> {
        let name = match self.kind {
            HeaderFooterKind::Header => "Header",
            HeaderFooterKind::Footer => "Footer",
        };
        check_children(name, Self::CHILDREN, false, &self.children)?;
        let children = render_children(&self.children, cx, &Ancestry::root())?;
        Ok(XmlElement::new(self.kind.root_element()).with_children(children))
    }

    /// Parse the part
    pub fn parse(
        kind: HeaderFooterKind,
        location: &str,
        xml: &[u8],
        relationships: Relationships,
        registry: &ComponentRegistry,
        bookmarks: &mut Bookmarks,
    ) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        if !root.is(kind.root_element()) {
            return Err(DocxError::InvalidStructure(format!(
                "{location} has root {}, expected {}",
                root.name,
                kind.root_element()
            )));
        }
        let children = {
            let mut cx = ParseContext {
                registry,
                relationships: &relationships,
                bookmarks,
            };
            cx.parse_children(&root, Self::CHILDREN)?
        };

        Ok(Self {
            kind,
            location: location.to_string(),
            relationships,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Paragraph, Text};

    #[test]
    fn test_round_trip() {
        let footer = HeaderFooterXml::new(
            HeaderFooterKind::Footer,
            "word/footer1.xml",
            vec![Paragraph::with_text("Page").into()],
        );
        assert_eq!(footer.content_type(), content_type::WML_FOOTER);

        let xml = footer
            .to_node(&mut RenderContext::new())
            .unwrap()
            .to_xml_document()
            .unwrap();
        let parsed = HeaderFooterXml::parse(
            HeaderFooterKind::Footer,
            "word/footer1.xml",
            &xml,
            Relationships::new("word/footer1.xml"),
            &ComponentRegistry::standard(),
            &mut Bookmarks::new(),
        )
        .unwrap();
        assert_eq!(parsed.children, footer.children);
    }

    #[test]
    fn test_wrong_root_fails() {
        let xml = br#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        let result = HeaderFooterXml::parse(
            HeaderFooterKind::Footer,
            "word/footer1.xml",
            xml,
            Relationships::new("word/footer1.xml"),
            &ComponentRegistry::standard(),
            &mut Bookmarks::new(),
        );
        assert!(matches!(result, Err(DocxError::InvalidStructure(_))));
    }

    #[test]
    fn test_runs_are_not_block_content() {
        let header = HeaderFooterXml::new(
            HeaderFooterKind::Header,
            "word/header1.xml",
            vec![Text::new("loose").into()],
        );
        assert!(matches!(
            header.to_node(&mut RenderContext::new()),
            Err(DocxError::IllegalChild {
                parent: "Header",
                child: "Text"
            })
        ));
    }
}
