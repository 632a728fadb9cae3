//! Paragraphs (`w:p`)

use std::any::Any;

use crate::component::{
    check_children, link_children, render_children, Ancestry, Component, ComponentType,
    LinkContext, ParseContext, RenderContext,
};
use crate::components::{Node, Text};
use crate::error::Result;
use crate::properties::ParagraphProperties;
use crate::styles::StyleType;
use crate::xml::{XmlElement, XmlNode};

/// A paragraph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Paragraph formatting
    pub props: ParagraphProperties,
    /// Runs and inline markers
    pub children: Vec<Node>,
}

impl Paragraph {
    /// An empty paragraph
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph holding one plain run
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().with_child(Text::new(text))
    }

    /// Builder: set the paragraph style
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.props.style = Some(style.into());
        self
    }

    /// Builder: set the formatting
    pub fn with_props(mut self, props: ParagraphProperties) -> Self {
        self.props = props;
        self
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a child
    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }
}

impl Component for Paragraph {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        check_children(Self::NAME, Self::CHILDREN, Self::MIXED, &self.children)?;
        if let Some(style) = &self.props.style {
            cx.reference_style(style, StyleType::Paragraph);
        }

        let me = ancestry.push(self);
        let paragraph = XmlElement::new("w:p")
            .with_opt_child(self.props.to_node())
            .with_children(render_children(&self.children, cx, &me)?);
        Ok(vec![paragraph.into()])
    }

    fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        link_children(&mut self.children, cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Paragraph {
    const NAME: &'static str = "Paragraph";
    const ELEMENT: Option<&'static str> = Some("w:p");
    const CHILDREN: &'static [&'static str] = &[
        "Text",
        "Hyperlink",
        "Insertion",
        "Deletion",
        "Comment",
        "CommentRangeStart",
        "CommentRangeEnd",
        "BookmarkRangeStart",
        "BookmarkRangeEnd",
    ];

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        Ok(Self {
            props: element
                .child("w:pPr")
                .map(ParagraphProperties::from_node)
                .unwrap_or_default(),
            children: cx.parse_children(element, Self::CHILDREN)?,
        })
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{parse_fragment, render_one};

    #[test]
    fn test_render_hello() {
        let el = render_one(&Paragraph::with_text("hello"), &Ancestry::root());
        assert_eq!(el.name, "w:p");
        assert!(el.child("w:pPr").is_none());
        assert_eq!(el.descendant("w:t").unwrap().text(), "hello");
    }

    #[test]
    fn test_style_is_recorded() {
        let mut cx = RenderContext::new();
        Paragraph::with_text("x")
            .with_style("Heading1")
            .to_nodes(&mut cx, &Ancestry::root())
            .unwrap();
        assert_eq!(
            cx.referenced_styles().get("Heading1"),
            Some(&StyleType::Paragraph)
        );
    }

    #[test]
    fn test_parse_skips_unknown_elements() {
        let paragraph: Paragraph = parse_fragment(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:proofErr w:type="spellStart"/><w:r><w:t>Hi</w:t></w:r></w:p>"#,
        );
        assert_eq!(paragraph.props.style.as_deref(), Some("Title"));
        assert_eq!(paragraph.children.len(), 1);
        assert_eq!(paragraph.children[0].text(), "Hi");
    }
}
