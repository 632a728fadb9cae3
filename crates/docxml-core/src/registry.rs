//! Name-keyed component registry
//!
//! Component kinds refer to their legal children by name, so mutually
//! nesting kinds (a table cell may hold a table) need no static cycle.
//! Registration happens in two phases: every kind is added to a
//! [`RegistryBuilder`], then [`RegistryBuilder::build`] resolves all child
//! names at once. The order of registration does not matter.

use std::collections::HashMap;

use crate::component::{ComponentType, ParseContext};
use crate::components::{
    BookmarkRangeEnd, BookmarkRangeStart, Break, Cell, Comment, CommentRangeEnd,
    CommentRangeStart, Deletion, Hyperlink, Image, Insertion, Node, Paragraph, Row, Section,
    Symbol, Tab, Table, Text,
};
use crate::error::{DocxError, Result};
use crate::xml::XmlElement;

type MatchFn = fn(&XmlElement) -> bool;
type ParseFn = fn(&XmlElement, &mut ParseContext<'_>) -> Result<Node>;

/// Everything the registry knows about one component kind
#[derive(Clone, Copy)]
pub struct ComponentDefinition {
    /// Registry name
    pub name: &'static str,
    /// Element the kind parses from; `None` for synthesized kinds
    pub element: Option<&'static str>,
    /// Names of the legal child kinds
    pub children: &'static [&'static str],
    /// Whether raw text children are legal
    pub mixed: bool,
    matches: MatchFn,
    parse: ParseFn,
}

impl std::fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("element", &self.element)
            .field("children", &self.children)
            .field("mixed", &self.mixed)
            .finish()
    }
}

impl ComponentDefinition {
    /// Definition of a statically known component kind
    pub fn of<T: ComponentType>() -> Self {
        Self {
            name: T::NAME,
            element: T::ELEMENT,
            children: T::CHILDREN,
            mixed: T::MIXED,
            matches: T::matches_node,
            parse: parse_into::<T>,
        }
    }

    /// Whether this kind parses the given element
    pub fn matches(&self, element: &XmlElement) -> bool {
        (self.matches)(element)
    }

    /// Parse an element as this kind
    pub fn parse(&self, element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Node> {
        (self.parse)(element, cx)
    }
}

fn parse_into<T: ComponentType>(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Node> {
    T::from_node(element, cx).map(T::into_node)
}

/// First phase: collect definitions
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: Vec<ComponentDefinition>,
}

impl RegistryBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder holding every built-in component kind
    pub fn standard() -> Self {
        Self::new()
            .register::<Section>()
            .register::<Paragraph>()
            .register::<Text>()
            .register::<Break>()
            .register::<Tab>()
            .register::<Symbol>()
            .register::<Image>()
            .register::<Hyperlink>()
            .register::<Insertion>()
            .register::<Deletion>()
            .register::<Comment>()
            .register::<CommentRangeStart>()
            .register::<CommentRangeEnd>()
            .register::<BookmarkRangeStart>()
            .register::<BookmarkRangeEnd>()
            .register::<Table>()
            .register::<Row>()
            .register::<Cell>()
    }

    /// Add a statically known kind
    pub fn register<T: ComponentType>(self) -> Self {
        self.register_definition(ComponentDefinition::of::<T>())
    }

    /// Add a definition; a later definition with the same name replaces
    /// the earlier one
    pub fn register_definition(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.retain(|d| d.name != definition.name);
        self.definitions.push(definition);
        self
    }

    /// Second phase: resolve every child name
    pub fn build(self) -> Result<ComponentRegistry> {
        let registry = self.assemble();
        for definition in registry.definitions.values() {
            for child in definition.children {
                if !registry.definitions.contains_key(child) {
                    return Err(DocxError::UnknownComponent(format!(
                        "{child} (legal child of {})",
                        definition.name
                    )));
                }
            }
        }
        Ok(registry)
    }

    fn assemble(self) -> ComponentRegistry {
        let mut definitions = HashMap::new();
        let mut by_element: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for definition in self.definitions {
            if let Some(element) = definition.element {
                by_element.entry(element).or_default().push(definition.name);
            }
            definitions.insert(definition.name, definition);
        }
        ComponentRegistry {
            definitions,
            by_element,
        }
    }
}

/// Resolved registry, passed explicitly to every parse entry point
#[derive(Debug)]
pub struct ComponentRegistry {
    definitions: HashMap<&'static str, ComponentDefinition>,
    by_element: HashMap<&'static str, Vec<&'static str>>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ComponentRegistry {
    /// Registry of the built-in component kinds
    pub fn standard() -> Self {
        // The built-in child lists only name built-in kinds
        RegistryBuilder::standard().assemble()
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(name)
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no kind is registered
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The legal kind that parses `element`, if any
    pub fn definition_for(&self, element: &XmlElement, legal: &[&str]) -> Option<&ComponentDefinition> {
        self.by_element
            .get(element.name.as_str())?
            .iter()
            .filter(|name| legal.contains(name))
            .filter_map(|name| self.definitions.get(name))
            .find(|definition| definition.matches(element))
    }

    /// Parse one element; elements no legal kind answers to are skipped
    pub fn parse_element(
        &self,
        element: &XmlElement,
        legal: &[&str],
        cx: &mut ParseContext<'_>,
    ) -> Result<Option<Node>> {
        match self.definition_for(element, legal) {
            Some(definition) => definition.parse(element, cx).map(Some),
            None => {
                log::debug!("skipping unsupported element <{}>", element.name);
                Ok(None)
            }
        }
    }

    /// Parse the child elements of `element` in order
    pub fn parse_children(
        &self,
        element: &XmlElement,
        legal: &[&str],
        cx: &mut ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for child in element.elements() {
            if let Some(node) = self.parse_element(child, legal, cx)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }
}
