//! Hyperlinks (`w:hyperlink`)

use std::any::Any;

use crate::component::{
    check_children, link_children, render_children, Ancestry, Component, ComponentType,
    LinkContext, ParseContext, RenderContext,
};
use crate::components::Node;
use crate::error::{DocxError, Result};
use crate::relationships::RelationshipType;
use crate::xml::{XmlElement, XmlNode};

/// Where a hyperlink points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperlinkTarget {
    /// External address, stored as an external relationship
    Url(String),
    /// Bookmark name inside the document
    Anchor(String),
}

/// A hyperlink around one or more runs
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperlink {
    /// Destination
    pub target: HyperlinkTarget,
    /// Hover text
    pub tooltip: Option<String>,
    /// Runs
    pub children: Vec<Node>,
    /// Relationship holding the URL, set by the pre-walk
    pub relationship: Option<String>,
}

impl Hyperlink {
    /// Link to an external address
    pub fn url(url: impl Into<String>) -> Self {
        Self::to(HyperlinkTarget::Url(url.into()))
    }

    /// Link to a bookmark
    pub fn anchor(name: impl Into<String>) -> Self {
        Self::to(HyperlinkTarget::Anchor(name.into()))
    }

    fn to(target: HyperlinkTarget) -> Self {
        Self {
            target,
            tooltip: None,
            children: Vec::new(),
            relationship: None,
        }
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: set the hover text
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

impl Component for Hyperlink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        check_children(Self::NAME, Self::CHILDREN, Self::MIXED, &self.children)?;

        let mut link = XmlElement::new("w:hyperlink");
        match &self.target {
            HyperlinkTarget::Url(url) => {
                let id = self.relationship.as_ref().ok_or_else(|| {
                    DocxError::InvalidStructure(format!(
                        "hyperlink to {url} rendered before its relationship was added"
                    ))
                })?;
                link.set_attr("r:id", id);
            }
            HyperlinkTarget::Anchor(name) => link.set_attr("w:anchor", name),
        }
        if let Some(tooltip) = &self.tooltip {
            link.set_attr("w:tooltip", tooltip);
        }

        let me = ancestry.push(self);
        link.children = render_children(&self.children, cx, &me)?;
        Ok(vec![link.into()])
    }

    fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        if let HyperlinkTarget::Url(url) = &self.target {
            let linked = self
                .relationship
                .as_deref()
                .and_then(|id| cx.relationships.meta(id))
                .is_some_and(|meta| meta.external && meta.target == *url);
            if !linked {
                let id = cx.relationships.add_external(RelationshipType::Hyperlink, url);
                self.relationship = Some(id);
            }
        }
        link_children(&mut self.children, cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Hyperlink {
    const NAME: &'static str = "Hyperlink";
    const ELEMENT: Option<&'static str> = Some("w:hyperlink");
    const CHILDREN: &'static [&'static str] = &["Text"];

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        let (target, relationship) = match element.attr("r:id") {
            Some(id) => {
                let meta = cx
                    .relationships
                    .meta(id)
                    .ok_or_else(|| DocxError::UnknownRelationship(id.to_string()))?;
                (
                    HyperlinkTarget::Url(meta.target.clone()),
                    Some(id.to_string()),
                )
            }
            None => (
                HyperlinkTarget::Anchor(element.attr("w:anchor").unwrap_or_default().to_string()),
                None,
            ),
        };

        Ok(Self {
            target,
            tooltip: element.attr("w:tooltip").map(str::to_string),
            children: cx.parse_children(element, Self::CHILDREN)?,
            relationship,
        })
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Text;
    use crate::relationships::Relationships;
    use crate::test_utils::{parse_fragment, parse_fragment_in, render_one};

    fn link(rels: &mut Relationships, hyperlink: &mut Hyperlink) {
        hyperlink
            .ensure_relationships(&mut LinkContext::new(rels, "media"))
            .unwrap();
    }

    #[test]
    fn test_url_needs_relationship() {
        let hyperlink = Hyperlink::url("https://example.com").with_child(Text::new("site"));
        let mut cx = RenderContext::new();
        assert!(hyperlink.to_nodes(&mut cx, &Ancestry::root()).is_err());
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut rels = Relationships::new("word/document.xml");
        let mut hyperlink = Hyperlink::url("https://example.com").with_child(Text::new("site"));
        link(&mut rels, &mut hyperlink);
        let first = hyperlink.relationship.clone();
        link(&mut rels, &mut hyperlink);

        assert_eq!(hyperlink.relationship, first);
        assert_eq!(rels.len(), 1);
        let meta = rels.meta(first.as_deref().unwrap()).unwrap();
        assert!(meta.external);
        assert_eq!(meta.rel_type, RelationshipType::Hyperlink);
    }

    #[test]
    fn test_round_trip_url() {
        let mut rels = Relationships::new("word/document.xml");
        let mut hyperlink = Hyperlink::url("https://example.com/?a=1&b=2")
            .with_tooltip("Example")
            .with_child(Text::new("site"));
        link(&mut rels, &mut hyperlink);

        let xml = render_one(&hyperlink, &Ancestry::root())
            .to_xml_string()
            .unwrap();
        let parsed: Hyperlink = parse_fragment_in(&xml, &rels);
        assert_eq!(parsed, hyperlink);
    }

    #[test]
    fn test_parse_anchor() {
        let parsed: Hyperlink = parse_fragment(
            r#"<w:hyperlink w:anchor="intro"><w:r><w:t>Intro</w:t></w:r></w:hyperlink>"#,
        );
        assert_eq!(parsed.target, HyperlinkTarget::Anchor("intro".into()));
        assert_eq!(parsed.children.len(), 1);
    }
}
