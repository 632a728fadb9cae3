//! Text runs and their inline leaves

use std::any::Any;

use crate::component::{
    check_children, link_children, Ancestry, Component, ComponentType, LinkContext, ParseContext,
    RenderContext,
};
use crate::components::{Deletion, Node};
use crate::error::Result;
use crate::properties::{value_enum, TextProperties};
use crate::styles::StyleType;
use crate::xml::{XmlElement, XmlNode};

/// A run of text sharing one set of formatting (`w:r`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    /// Run formatting
    pub props: TextProperties,
    /// Raw text and inline leaves
    pub children: Vec<Node>,
}

impl Text {
    /// A plain run holding `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            props: TextProperties::default(),
            children: vec![Node::Raw(text.into())],
        }
    }

    /// Builder: set the formatting
    pub fn with_props(mut self, props: TextProperties) -> Self {
        self.props = props;
        self
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Concatenated raw text
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Node::Raw(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Component for Text {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        check_children(Self::NAME, Self::CHILDREN, Self::MIXED, &self.children)?;
        if let Some(style) = &self.props.style {
            cx.reference_style(style, StyleType::Character);
        }

        let text_element = if ancestry.contains::<Deletion>() {
            "w:delText"
        } else {
            "w:t"
        };
        let me = ancestry.push(self);
        let mut run = XmlElement::new("w:r").with_opt_child(self.props.to_node());
        for child in &self.children {
            match child {
                Node::Raw(text) => {
                    let mut t = XmlElement::new(text_element);
                    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                        t.set_attr("xml:space", "preserve");
                    }
                    run.push(t.with_text(text.as_str()));
                }
                other => run.children.extend(other.to_nodes(cx, &me)?),
            }
        }
        Ok(vec![run.into()])
    }

    fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        link_children(&mut self.children, cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Text {
    const NAME: &'static str = "Text";
    const ELEMENT: Option<&'static str> = Some("w:r");
    const CHILDREN: &'static [&'static str] = &["Break", "Tab", "Symbol", "Image"];
    const MIXED: bool = true;

    fn matches_node(element: &XmlElement) -> bool {
        element.is("w:r") && element.child("w:commentReference").is_none()
    }

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        let mut text = Text {
            props: element
                .child("w:rPr")
                .map(TextProperties::from_node)
                .unwrap_or_default(),
            children: Vec::new(),
        };
        for child in element.elements() {
            match child.name.as_str() {
                "w:rPr" => {}
                "w:t" | "w:delText" => text.children.push(Node::Raw(child.text())),
                _ => {
                    if let Some(node) = cx.parse_element(child, Self::CHILDREN)? {
                        text.children.push(node);
                    }
                }
            }
        }
        Ok(text)
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

value_enum! {
    /// Kind of break (`w:br/@w:type`)
    pub enum BreakType {
        /// Continue on the next page
        Page => "page",
        /// Continue in the next column
        Column => "column",
        /// Line break
        TextWrapping => "textWrapping",
    }
}

/// A break inside a run (`w:br`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Break {
    /// Break kind; a line break when absent
    pub kind: Option<BreakType>,
}

impl Break {
    /// Page break
    pub fn page() -> Self {
        Self {
            kind: Some(BreakType::Page),
        }
    }
}

impl Component for Break {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, _cx: &mut RenderContext, _ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        Ok(vec![XmlElement::new("w:br")
            .with_opt_attr("w:type", self.kind)
            .into()])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Break {
    const NAME: &'static str = "Break";
    const ELEMENT: Option<&'static str> = Some("w:br");
    const CHILDREN: &'static [&'static str] = &[];

    fn from_node(element: &XmlElement, _cx: &mut ParseContext<'_>) -> Result<Self> {
        Ok(Self {
            kind: element.attr("w:type").and_then(|t| t.parse().ok()),
        })
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

/// A tab character (`w:tab`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tab;

impl Component for Tab {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, _cx: &mut RenderContext, _ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        Ok(vec![XmlElement::new("w:tab").into()])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Tab {
    const NAME: &'static str = "Tab";
    const ELEMENT: Option<&'static str> = Some("w:tab");
    const CHILDREN: &'static [&'static str] = &[];

    fn from_node(_element: &XmlElement, _cx: &mut ParseContext<'_>) -> Result<Self> {
        Ok(Tab)
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

/// A character from a symbol font (`w:sym`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Font family
    pub font: String,
    /// Character code, hexadecimal
    pub char_code: String,
}

impl Symbol {
    /// Symbol `char_code` (hex) from `font`
    pub fn new(font: impl Into<String>, char_code: impl Into<String>) -> Self {
        Self {
            font: font.into(),
            char_code: char_code.into(),
        }
    }
}

impl Component for Symbol {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, _cx: &mut RenderContext, _ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        Ok(vec![XmlElement::new("w:sym")
            .with_attr("w:font", &self.font)
            .with_attr("w:char", &self.char_code)
            .into()])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Symbol {
    const NAME: &'static str = "Symbol";
    const ELEMENT: Option<&'static str> = Some("w:sym");
    const CHILDREN: &'static [&'static str] = &[];

    fn from_node(element: &XmlElement, _cx: &mut ParseContext<'_>) -> Result<Self> {
        Ok(Self::new(
            element.attr("w:font").unwrap_or_default(),
            element.attr("w:char").unwrap_or_default(),
        ))
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Paragraph;
    use crate::test_utils::{parse_fragment, render_one};

    #[test]
    fn test_render_preserves_edge_whitespace() {
        let run = Text::new(" padded ");
        let el = render_one(&run, &Ancestry::root());
        let t = el.child("w:t").unwrap();
        assert_eq!(t.attr("xml:space"), Some("preserve"));
        assert_eq!(t.text(), " padded ");

        let plain = render_one(&Text::new("plain"), &Ancestry::root());
        assert_eq!(plain.child("w:t").unwrap().attr("xml:space"), None);
    }

    #[test]
    fn test_mixed_children_render_in_order() {
        let run = Text::new("a").with_child(Tab).with_child("b").with_child(Break::page());
        let el = render_one(&run, &Ancestry::root());
        let names: Vec<&str> = el.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:t", "w:tab", "w:t", "w:br"]);
        assert_eq!(el.child("w:br").unwrap().attr("w:type"), Some("page"));
    }

    #[test]
    fn test_character_style_is_recorded() {
        let run = Text::new("x").with_props(TextProperties {
            style: Some("Strong".into()),
            ..Default::default()
        });
        let mut cx = RenderContext::new();
        run.to_nodes(&mut cx, &Ancestry::root()).unwrap();
        assert_eq!(
            cx.referenced_styles().get("Strong"),
            Some(&StyleType::Character)
        );
    }

    #[test]
    fn test_parse_run() {
        let run: Text = parse_fragment(
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>one</w:t><w:tab/><w:sym w:font="Wingdings" w:char="F0E0"/><w:t xml:space="preserve"> two</w:t></w:r>"#,
        );
        assert_eq!(run.props.bold, Some(true));
        assert_eq!(run.text(), "one two");
        assert_eq!(run.children[1], Node::Tab(Tab));
        assert_eq!(
            run.children[2],
            Node::Symbol(Symbol::new("Wingdings", "F0E0"))
        );
    }

    #[test]
    fn test_raw_text_in_paragraph_is_illegal() {
        let paragraph = Paragraph::new().with_child("loose");
        let mut cx = RenderContext::new();
        assert!(paragraph.to_nodes(&mut cx, &Ancestry::root()).is_err());
    }
}
