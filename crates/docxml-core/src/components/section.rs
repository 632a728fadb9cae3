//! Sections
//!
//! A section has no element of its own. Every section but the last closes
//! with a paragraph whose properties hold its `w:sectPr`; the last one puts
//! `w:sectPr` directly at the end of `w:body`.

use std::any::Any;
use std::mem;

use crate::component::{
    check_children, link_children, render_children, Ancestry, Component, ComponentType,
    LinkContext, ParseContext, RenderContext,
};
use crate::components::Node;
use crate::error::Result;
use crate::parts::{HeaderFooterXml, Part};
use crate::properties::{HeaderFooterKind, HeaderFooterRef, ParagraphProperties, SectionProperties};
use crate::xml::{XmlElement, XmlNode};

/// A run of body content sharing page setup, headers and footers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Page setup and header/footer slots
    pub props: SectionProperties,
    /// Block-level content
    pub children: Vec<Node>,
}

impl Section {
    /// An empty section with default page setup
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the properties
    pub fn with_props(mut self, props: SectionProperties) -> Self {
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

    /// Render the section's content and its section break
    ///
    /// The final section of a body emits `w:sectPr` as a direct child;
    /// any other section emits a paragraph carrying it.
    pub fn render_body(
        &self,
        cx: &mut RenderContext,
        ancestry: &Ancestry<'_>,
        is_final: bool,
    ) -> Result<Vec<XmlNode>> {
        check_children(Self::NAME, Self::CHILDREN, Self::MIXED, &self.children)?;
        let me = ancestry.push(self);
        let mut nodes = render_children(&self.children, cx, &me)?;

        let sect_pr = self.props.to_node()?;
        if is_final {
            nodes.push(sect_pr.into());
        } else {
            let properties = ParagraphProperties::default().to_node_with([sect_pr]);
            nodes.push(XmlElement::new("w:p").with_child(properties).into());
        }
        Ok(nodes)
    }

    /// Split the children of `w:body` into sections
    pub fn split_body(body: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Vec<Section>> {
        let mut sections = Vec::new();
        let mut current = Vec::new();

        for child in body.elements() {
            if child.is("w:sectPr") {
                sections.push(Section {
                    props: SectionProperties::from_node(child),
                    children: mem::take(&mut current),
                });
                continue;
            }

            let boundary = if child.is("w:p") {
                child.child("w:pPr").and_then(|p| p.child("w:sectPr"))
            } else {
                None
            };
            if !boundary.is_some_and(|_| is_break_only(child)) {
                if let Some(node) = cx.parse_element(child, Self::CHILDREN)? {
                    current.push(node);
                }
            }
            if let Some(sect_pr) = boundary {
                sections.push(Section {
                    props: SectionProperties::from_node(sect_pr),
                    children: mem::take(&mut current),
                });
            }
        }

        if !current.is_empty() || sections.is_empty() {
            sections.push(Section {
                props: SectionProperties::default(),
                children: current,
            });
        }
        Ok(sections)
    }
}

/// A paragraph whose only content is its section break
fn is_break_only(paragraph: &XmlElement) -> bool {
    paragraph.elements().all(|child| {
        child.is("w:pPr")
            && child
                .elements()
                .all(|p| p.is("w:sectPr") || p.is("w:rPr"))
    })
}

impl Component for Section {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        self.render_body(cx, ancestry, false)
    }

    fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        link_children(&mut self.children, cx)?;

        for kind in [HeaderFooterKind::Header, HeaderFooterKind::Footer] {
            for (_, slot) in self.props.slots_mut(kind).iter_mut() {
                let HeaderFooterRef::Content(children) = slot else {
                    continue;
                };
                let location = cx.relationships.free_location(kind.stem(), "xml");
                let part = HeaderFooterXml::new(kind, location, mem::take(children));
                let id = cx
                    .relationships
                    .add_part(kind.relationship_type(), Part::HeaderFooter(part));
                *slot = HeaderFooterRef::Linked(id);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Section {
    const NAME: &'static str = "Section";
    const ELEMENT: Option<&'static str> = None;
    const CHILDREN: &'static [&'static str] =
        &["Paragraph", "Table", "BookmarkRangeStart", "BookmarkRangeEnd"];

    /// Parse a container element as a single section
    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        let props = element
            .child("w:sectPr")
            .map(SectionProperties::from_node)
            .unwrap_or_default();
        Ok(Self {
            props,
            children: cx.parse_children(element, Self::CHILDREN)?,
        })
    }

    fn into_node(self) -> Node {
        self.into()
    }
}
