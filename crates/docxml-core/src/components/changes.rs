//! Tracked insertions and deletions (`w:ins`, `w:del`)

use std::any::Any;

use crate::component::{
    check_children, link_children, render_children, Ancestry, Component, ComponentType,
    LinkContext, ParseContext, RenderContext,
};
use crate::components::Node;
use crate::error::{DocxError, Result};
use crate::properties::Change;
use crate::xml::{XmlElement, XmlNode};

macro_rules! tracked_change {
    ($(#[$meta:meta])* $kind:ident, $name:literal, $element:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $kind {
            /// Revision id, author and date
            pub change: Change,
            /// Affected runs
            pub children: Vec<Node>,
        }

        impl $kind {
            /// A tracked change with no content yet
            pub fn new(change: Change) -> Self {
                Self {
                    change,
                    children: Vec::new(),
                }
            }

            /// Builder: append a child
            pub fn with_child(mut self, child: impl Into<Node>) -> Self {
                self.children.push(child.into());
                self
            }
        }

        impl Component for $kind {
            fn name(&self) -> &'static str {
                Self::NAME
            }

            fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
                check_children(Self::NAME, Self::CHILDREN, Self::MIXED, &self.children)?;
                let me = ancestry.push(self);
                let element = self
                    .change
                    .apply(XmlElement::new($element))
                    .with_children(render_children(&self.children, cx, &me)?);
                Ok(vec![element.into()])
            }

            fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
                link_children(&mut self.children, cx)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        impl ComponentType for $kind {
            const NAME: &'static str = $name;
            const ELEMENT: Option<&'static str> = Some($element);
            const CHILDREN: &'static [&'static str] = &["Text"];

            fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
                let change = Change::from_node(element).ok_or_else(|| DocxError::InvalidValue {
                    attribute: concat!($element, "/@w:id").to_string(),
                    value: element.attr("w:id").unwrap_or_default().to_string(),
                })?;
                Ok(Self {
                    change,
                    children: cx.parse_children(element, Self::CHILDREN)?,
                })
            }

            fn into_node(self) -> Node {
                self.into()
            }
        }
    };
}

tracked_change!(
    /// Runs inserted while tracking changes
    Insertion,
    "Insertion",
    "w:ins"
);

tracked_change!(
    /// Runs deleted while tracking changes; their text renders as `w:delText`
    Deletion,
    "Deletion",
    "w:del"
);
