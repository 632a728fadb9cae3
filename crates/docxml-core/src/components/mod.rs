//! Document-tree components
//!
//! [`Node`] is the closed set of kinds a child list may hold. Parsing
//! dispatches through the [`ComponentRegistry`](crate::registry::ComponentRegistry)
//! by element name; rendering dispatches through [`Component`].

mod bookmarks;
mod changes;
mod comments;
mod hyperlink;
mod image;
mod paragraph;
mod section;
mod table;
mod text;

pub use bookmarks::{BookmarkRangeEnd, BookmarkRangeStart};
pub use changes::{Deletion, Insertion};
pub use comments::{Comment, CommentRangeEnd, CommentRangeStart};
pub use hyperlink::{Hyperlink, HyperlinkTarget};
pub use image::Image;
pub use paragraph::Paragraph;
pub use section::Section;
pub use table::{Cell, Row, Table};
pub use text::{Break, BreakType, Symbol, Tab, Text};

use crate::component::{Ancestry, Component, ComponentType, LinkContext, RenderContext};
use crate::error::Result;
use crate::xml::XmlNode;

macro_rules! node_kinds {
    ($($kind:ident),+ $(,)?) => {
        /// A child of a component: any component kind, or raw text
        #[derive(Debug, Clone, PartialEq)]
        pub enum Node {
            $(
                #[allow(missing_docs)]
                $kind($kind),
            )+
            /// Character data, legal only where the parent is mixed
            Raw(String),
        }

        impl Node {
            /// Registry name of the kind; `#text` for raw text
            pub fn name(&self) -> &'static str {
                match self {
                    $( Node::$kind(_) => <$kind as ComponentType>::NAME, )+
                    Node::Raw(_) => "#text",
                }
            }

            /// The component, unless this is raw text
            pub fn component(&self) -> Option<&dyn Component> {
                match self {
                    $( Node::$kind(c) => Some(c), )+
                    Node::Raw(_) => None,
                }
            }

            /// The component, mutably
            pub fn component_mut(&mut self) -> Option<&mut dyn Component> {
                match self {
                    $( Node::$kind(c) => Some(c), )+
                    Node::Raw(_) => None,
                }
            }
        }

        $(
            impl From<$kind> for Node {
                fn from(component: $kind) -> Self {
                    Node::$kind(component)
                }
            }
        )+
    };
}

node_kinds!(
    Section,
    Paragraph,
    Text,
    Break,
    Tab,
    Symbol,
    Image,
    Hyperlink,
    Insertion,
    Deletion,
    Comment,
    CommentRangeStart,
    CommentRangeEnd,
    BookmarkRangeStart,
    BookmarkRangeEnd,
    Table,
    Row,
    Cell,
);

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Raw(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Raw(text)
    }
}

impl Node {
    /// Render this node
    pub fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        match self {
            Node::Raw(text) => Ok(vec![XmlNode::Text(text.clone())]),
            other => match other.component() {
                Some(component) => component.to_nodes(cx, ancestry),
                None => Ok(Vec::new()),
            },
        }
    }

    /// Run the relationship pre-walk on this node
    pub fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        match self.component_mut() {
            Some(component) => component.ensure_relationships(cx),
            None => Ok(()),
        }
    }

    /// The component as a concrete kind
    pub fn downcast<T: Component>(&self) -> Option<&T> {
        self.component()?.as_any().downcast_ref::<T>()
    }

    /// Child list of container kinds; empty for leaves
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Section(c) => &c.children,
            Node::Paragraph(c) => &c.children,
            Node::Text(c) => &c.children,
            Node::Hyperlink(c) => &c.children,
            Node::Insertion(c) => &c.children,
            Node::Deletion(c) => &c.children,
            Node::Cell(c) => &c.children,
            _ => &[],
        }
    }

    /// Plain text content, with tabs and breaks as whitespace
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Raw(text) => out.push_str(text),
            Node::Tab(_) => out.push('\t'),
            Node::Break(_) => out.push('\n'),
            Node::Table(table) => {
                for row in &table.rows {
                    let cells: Vec<String> = row
                        .cells
                        .iter()
                        .map(|cell| {
                            let mut text = String::new();
                            for child in &cell.children {
                                child.collect_text(&mut text);
                            }
                            text
                        })
                        .collect();
                    out.push_str(&cells.join("\t"));
                    out.push('\n');
                }
            }
            Node::Row(row) => {
                for cell in &row.cells {
                    for child in &cell.children {
                        child.collect_text(out);
                    }
                }
            }
            other => {
                for child in other.children() {
                    child.collect_text(out);
                }
                if matches!(other, Node::Paragraph(_)) {
                    out.push('\n');
                }
            }
        }
    }
}
