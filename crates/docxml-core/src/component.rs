//! The component contract
//!
//! Every document-tree node implements [`Component`] (rendering, and the
//! relationship pre-walk) and [`ComponentType`] (the static side: name,
//! legal children, element matching and parsing). Ancestry is passed down
//! explicitly while rendering; components never point at their parents.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::bookmarks::Bookmarks;
use crate::components::{Node, Table};
use crate::error::{DocxError, Result};
use crate::registry::ComponentRegistry;
use crate::relationships::Relationships;
use crate::styles::StyleType;
use crate::table_model::TableGridModel;
use crate::xml::{XmlElement, XmlNode};

/// A node of the document tree that knows how to render itself
pub trait Component: fmt::Debug + Any {
    /// Registry name of the component kind
    fn name(&self) -> &'static str;

    /// Render to zero or more XML nodes
    ///
    /// `ancestry` lists the structural ancestors, nearest first. It does
    /// not include `self`.
    fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>>;

    /// Register the relationships this subtree needs before rendering
    fn ensure_relationships(&mut self, _cx: &mut LinkContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Upcast for ancestry lookups
    fn as_any(&self) -> &dyn Any;
}

/// Static side of a component kind
pub trait ComponentType: Component + Sized {
    /// Registry name
    const NAME: &'static str;
    /// Qualified element name that this kind parses from, if any
    const ELEMENT: Option<&'static str>;
    /// Registry names of the legal child kinds
    const CHILDREN: &'static [&'static str];
    /// Whether raw text children are legal
    const MIXED: bool = false;

    /// Fast type-only test used to choose a parser among candidates that
    /// share an element name
    fn matches_node(element: &XmlElement) -> bool {
        Self::ELEMENT == Some(element.name.as_str())
    }

    /// Parse an element, resolving children through the registry
    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self>;

    /// Wrap in the tree's node type
    fn into_node(self) -> Node;
}

/// Structural ancestors of the component being rendered, nearest first
#[derive(Clone, Copy)]
pub struct Ancestry<'a> {
    head: Option<(&'a dyn Component, &'a Ancestry<'a>)>,
}

impl fmt::Debug for Ancestry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<'a> Ancestry<'a> {
    /// Ancestry of a top-level component
    pub fn root() -> Self {
        Self { head: None }
    }

    /// Ancestry of a child of `component`
    pub fn push<'b>(&'b self, component: &'b dyn Component) -> Ancestry<'b> {
        Ancestry {
            head: Some((component, self)),
        }
    }

    /// Nearest ancestor of type `T`
    pub fn find<T: Component>(&self) -> Option<&'a T> {
        let mut current = self.head;
        while let Some((component, parent)) = current {
            if let Some(found) = component.as_any().downcast_ref::<T>() {
                return Some(found);
            }
            current = parent.head;
        }
        None
    }

    /// Whether any ancestor has type `T`
    pub fn contains<T: Component>(&self) -> bool {
        self.find::<T>().is_some()
    }

    /// Names of the ancestors, nearest first
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut current = self.head;
        while let Some((component, parent)) = current {
            names.push(component.name());
            current = parent.head;
        }
        names
    }
}

/// State shared by all components during one render pass
#[derive(Debug, Default)]
pub struct RenderContext {
    style_refs: BTreeMap<String, StyleType>,
    comment_ids: Option<BTreeSet<u32>>,
    next_drawing_id: u32,
    tables: HashMap<usize, Rc<TableGridModel>>,
}

impl RenderContext {
    /// Context with no comments part
    pub fn new() -> Self {
        Self {
            next_drawing_id: 1,
            ..Self::default()
        }
    }

    /// Context that accepts references to the given comment ids
    pub fn with_comments(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            comment_ids: Some(ids.into_iter().collect()),
            ..Self::new()
        }
    }

    /// Record that a style id was used
    pub fn reference_style(&mut self, id: &str, kind: StyleType) {
        self.style_refs.entry(id.to_string()).or_insert(kind);
    }

    /// Every style id used so far, with the kind of its first use
    pub fn referenced_styles(&self) -> &BTreeMap<String, StyleType> {
        &self.style_refs
    }

    /// Fail unless a comment with this id exists
    pub fn check_comment(&self, id: u32) -> Result<()> {
        match &self.comment_ids {
            Some(ids) if ids.contains(&id) => Ok(()),
            _ => Err(DocxError::UnknownComment(id)),
        }
    }

    /// Unique id for a drawing object within this pass
    pub fn next_drawing_id(&mut self) -> u32 {
        let id = self.next_drawing_id.max(1);
        self.next_drawing_id = id + 1;
        id
    }

    /// Compute the layout model of a table and keep it until
    /// [`leave_table`](Self::leave_table), so its rows and cells share it
    pub(crate) fn enter_table(&mut self, table: &Table) -> Rc<TableGridModel> {
        let model = Rc::new(TableGridModel::from_table(table));
        self.tables.insert(table_key(table), Rc::clone(&model));
        model
    }

    /// Drop the model kept by [`enter_table`](Self::enter_table)
    pub(crate) fn leave_table(&mut self, table: &Table) {
        self.tables.remove(&table_key(table));
    }

    /// Layout model of a table being rendered, or a fresh one
    pub(crate) fn table_model(&self, table: &Table) -> Rc<TableGridModel> {
        match self.tables.get(&table_key(table)) {
            Some(model) => Rc::clone(model),
            None => Rc::new(TableGridModel::from_table(table)),
        }
    }
}

// Only valid while the table is borrowed for rendering
fn table_key(table: &Table) -> usize {
    table as *const Table as usize
}

/// Inputs available while parsing a part's components
pub struct ParseContext<'a> {
    /// Resolves child kinds by name
    pub registry: &'a ComponentRegistry,
    /// Relationships of the part being parsed
    pub relationships: &'a Relationships,
    /// Document-wide bookmark registry
    pub bookmarks: &'a mut Bookmarks,
}

impl ParseContext<'_> {
    /// Parse the legal children of `element`
    pub fn parse_children(&mut self, element: &XmlElement, legal: &[&str]) -> Result<Vec<Node>> {
        let registry = self.registry;
        registry.parse_children(element, legal, self)
    }

    /// Parse a single element if a legal kind matches it
    pub fn parse_element(&mut self, element: &XmlElement, legal: &[&str]) -> Result<Option<Node>> {
        let registry = self.registry;
        registry.parse_element(element, legal, self)
    }
}

/// Inputs of the relationship pre-walk
pub struct LinkContext<'a> {
    /// Relationships of the part that owns the subtree
    pub relationships: &'a mut Relationships,
    /// Folder for embedded media, relative to the owning part
    pub media_directory: &'a str,
    released_media: BTreeSet<String>,
    kept_media: BTreeSet<String>,
}

impl<'a> LinkContext<'a> {
    /// Pre-walk over the subtree owning `relationships`
    pub fn new(relationships: &'a mut Relationships, media_directory: &'a str) -> Self {
        Self {
            relationships,
            media_directory,
            released_media: BTreeSet::new(),
            kept_media: BTreeSet::new(),
        }
    }

    /// Relationship id of embedded media, adding the part if needed
    pub fn link_media(&mut self, data: &[u8]) -> String {
        let id = self.relationships.add_media(data, self.media_directory);
        self.kept_media.insert(id.clone());
        id
    }

    /// Note that a component still embeds the media behind `id`
    pub fn keep_media(&mut self, id: &str) {
        self.kept_media.insert(id.to_string());
    }

    /// Note that a component no longer embeds the media behind `id`
    pub fn release_media(&mut self, id: &str) {
        self.released_media.insert(id.to_string());
    }

    /// End the walk, removing released media that nothing kept
    pub fn finish(mut self) {
        for id in self.released_media.difference(&self.kept_media) {
            if self.relationships.remove(id).is_some() {
                log::debug!("{}: dropped unused media {id}", self.relationships.location());
            }
        }
    }
}

/// Fail if a child list breaks the parent's static legal-children list
pub(crate) fn check_children(
    parent: &'static str,
    legal: &[&str],
    mixed: bool,
    children: &[Node],
) -> Result<()> {
    for child in children {
        let ok = match child {
            Node::Raw(_) => mixed,
            other => legal.contains(&other.name()),
        };
        if !ok {
            return Err(DocxError::IllegalChild {
                parent,
                child: child.name(),
            });
        }
    }
    Ok(())
}

/// Render a child list in order
pub(crate) fn render_children(
    children: &[Node],
    cx: &mut RenderContext,
    ancestry: &Ancestry<'_>,
) -> Result<Vec<XmlNode>> {
    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        nodes.extend(child.to_nodes(cx, ancestry)?);
    }
    Ok(nodes)
}

/// Run the relationship pre-walk over a child list
pub(crate) fn link_children(children: &mut [Node], cx: &mut LinkContext<'_>) -> Result<()> {
    for child in children {
        child.ensure_relationships(cx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Cell, Paragraph, Row, Text};

    #[test]
    fn test_ancestry_find_nearest() {
        let outer = Paragraph::new();
        let inner = Text::new("x");
        let root = Ancestry::root();
        let one = root.push(&outer);
        let two = one.push(&inner);

        assert!(two.find::<Paragraph>().is_some());
        assert!(two.find::<Text>().is_some());
        assert!(two.find::<Table>().is_none());
        assert_eq!(two.names(), vec!["Text", "Paragraph"]);
    }

    #[test]
    fn test_check_children_rejects_raw_text() {
        let children = vec![Node::Raw("loose".into())];
        let err = check_children("Paragraph", Paragraph::CHILDREN, false, &children).unwrap_err();
        assert!(matches!(err, DocxError::IllegalChild { child: "#text", .. }));
    }

    #[test]
    fn test_check_children_rejects_wrong_kind() {
        let children = vec![Row::new(vec![Cell::new()]).into_node()];
        let err = check_children("Paragraph", Paragraph::CHILDREN, false, &children).unwrap_err();
        assert!(matches!(
            err,
            DocxError::IllegalChild {
                parent: "Paragraph",
                child: "Row"
            }
        ));
    }

    #[test]
    fn test_comment_check() {
        let cx = RenderContext::with_comments([0, 2]);
        assert!(cx.check_comment(2).is_ok());
        assert!(matches!(cx.check_comment(1), Err(DocxError::UnknownComment(1))));
        assert!(RenderContext::new().check_comment(0).is_err());
    }

    #[test]
    fn test_drawing_ids_increase() {
        let mut cx = RenderContext::new();
        assert_eq!(cx.next_drawing_id(), 1);
        assert_eq!(cx.next_drawing_id(), 2);
    }
}
