//! Comment anchors in the document body
//!
//! The comment text lives in the comments part; the body only carries the
//! range markers and the reference run. Every id must exist in the comments
//! part when the body is rendered.

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

/// The reference mark of a comment (`w:r/w:commentReference`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    /// Comment id
    pub id: u32,
}

impl Comment {
    /// Reference to comment `id`
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

impl Component for Comment {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, _ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        cx.check_comment(self.id)?;
        let run = XmlElement::new("w:r").with_child(
            XmlElement::new("w:commentReference").with_attr("w:id", self.id),
        );
        Ok(vec![run.into()])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Comment {
    const NAME: &'static str = "Comment";
    const ELEMENT: Option<&'static str> = Some("w:r");
    const CHILDREN: &'static [&'static str] = &[];

    fn matches_node(element: &XmlElement) -> bool {
        element.is("w:r") && element.child("w:commentReference").is_some()
    }

    fn from_node(element: &XmlElement, _cx: &mut ParseContext<'_>) -> Result<Self> {
        let reference = element
            .child("w:commentReference")
            .ok_or_else(|| DocxError::InvalidStructure("run without w:commentReference".into()))?;
        Ok(Self::new(read_id(reference)?))
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

macro_rules! range_marker {
    ($(#[$meta:meta])* $kind:ident, $element:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $kind {
            /// Comment id
            pub id: u32,
        }

        impl $kind {
            /// Marker for comment `id`
            pub fn new(id: u32) -> Self {
                Self { id }
            }
        }

        impl Component for $kind {
            fn name(&self) -> &'static str {
                Self::NAME
            }

            fn to_nodes(&self, cx: &mut RenderContext, _ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
                cx.check_comment(self.id)?;
                Ok(vec![XmlElement::new($element).with_attr("w:id", self.id).into()])
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        impl ComponentType for $kind {
            const NAME: &'static str = stringify!($kind);
            const ELEMENT: Option<&'static str> = Some($element);
            const CHILDREN: &'static [&'static str] = &[];

            fn from_node(element: &XmlElement, _cx: &mut ParseContext<'_>) -> Result<Self> {
                Ok(Self::new(read_id(element)?))
            }

            fn into_node(self) -> Node {
                self.into()
            }
        }
    };
}

range_marker!(
    /// Start of the commented range
    CommentRangeStart,
    "w:commentRangeStart"
);

range_marker!(
    /// End of the commented range
    CommentRangeEnd,
    "w:commentRangeEnd"
);
