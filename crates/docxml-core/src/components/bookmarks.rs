//! Bookmark markers (`w:bookmarkStart`, `w:bookmarkEnd`)

use std::any::Any;

use crate::component::{Ancestry, Component, ComponentType, ParseContext, RenderContext};
use crate::components::Node;
use crate::error::{DocxError, Result};
use crate::xml::{XmlElement, XmlNode};

fn read_id(element: &XmlElement) -> Result<u32> {
    element
        .attr_parsed("w:id")
        .ok_or_else(|| DocxError::InvalidValue {
            attribute: format!("{}/@w:id", element.name),
            value: element.attr("w:id").unwrap_or_default().to_string(),
        })
}

/// Start of a named range
///
/// Ids come from [`Bookmarks::create`](crate::bookmarks::Bookmarks::create);
/// parsing registers them with the document's bookmark registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkRangeStart {
    /// Bookmark id
    pub id: u32,
    /// Bookmark name
    pub name: String,
}

impl BookmarkRangeStart {
    /// Start marker
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Component for BookmarkRangeStart {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, _cx: &mut RenderContext, _ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        Ok(vec![XmlElement::new("w:bookmarkStart")
            .with_attr("w:id", self.id)
            .with_attr("w:name", &self.name)
            .into()])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for BookmarkRangeStart {
    const NAME: &'static str = "BookmarkRangeStart";
    const ELEMENT: Option<&'static str> = Some("w:bookmarkStart");
    const CHILDREN: &'static [&'static str] = &[];

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        let start = Self::new(read_id(element)?, element.attr("w:name").unwrap_or_default());
        cx.bookmarks.register(start.id, &start.name)?;
        Ok(start)
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

/// End of a named range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookmarkRangeEnd {
    /// Bookmark id
    pub id: u32,
}

impl BookmarkRangeEnd {
    /// End marker
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

impl Component for BookmarkRangeEnd {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, _cx: &mut RenderContext, _ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        Ok(vec![XmlElement::new("w:bookmarkEnd")
            .with_attr("w:id", self.id)
            .into()])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for BookmarkRangeEnd {
    const NAME: &'static str = "BookmarkRangeEnd";
    const ELEMENT: Option<&'static str> = Some("w:bookmarkEnd");
    const CHILDREN: &'static [&'static str] = &[];

    fn from_node(element: &XmlElement, _cx: &mut ParseContext<'_>) -> Result<Self> {
        Ok(Self::new(read_id(element)?))
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Paragraph;
    use crate::test_utils::try_parse_fragment;

    #[test]
    fn test_duplicate_bookmark_id_fails() {
        let xml = r#"<w:p><w:bookmarkStart w:id="0" w:name="a"/><w:bookmarkEnd w:id="0"/><w:bookmarkStart w:id="0" w:name="b"/></w:p>"#;
        let result = try_parse_fragment::<Paragraph>(xml);
        assert!(matches!(result, Err(DocxError::DuplicateBookmark(0))));
    }

    #[test]
    fn test_parse_registers_bookmark() {
        let xml = r#"<w:p><w:bookmarkStart w:id="3" w:name="intro"/><w:bookmarkEnd w:id="3"/></w:p>"#;
        let paragraph = try_parse_fragment::<Paragraph>(xml).unwrap();
        assert_eq!(
            paragraph.children,
            vec![
                Node::BookmarkRangeStart(BookmarkRangeStart::new(3, "intro")),
                Node::BookmarkRangeEnd(BookmarkRangeEnd::new(3)),
            ]
        );
    }
}
