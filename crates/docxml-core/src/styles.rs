//! Style definitions (`word/styles.xml`)
//!
//! A [`StyleSheet`] holds the document defaults and the named styles of a
//! package, in document order. Styles that content refers to but that were
//! never defined get a placeholder when the package is written, so every
//! `w:pStyle`/`w:rStyle`/`w:tblStyle` reference resolves.

use std::collections::HashSet;

use log::debug;

use crate::error::{DocxError, Result};
use crate::properties::{value_enum, ParagraphProperties, TableProperties, TextProperties};
use crate::xml::{XmlElement, XmlNode};

value_enum! {
    /// Type of style
    pub enum StyleType {
        /// Paragraph style
        Paragraph => "paragraph",
        /// Character (run) style
        Character => "character",
        /// Table style
        Table => "table",
        /// Numbering style
        Numbering => "numbering",
    }
}

/// A Word style definition
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Style type
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
    /// Next style ID (for following paragraphs)
    pub next: Option<String>,
    /// Default style of its type
    pub is_default: bool,
    /// User-defined rather than built in
    pub custom: bool,
    /// UI priority for sorting
    pub ui_priority: Option<u32>,
    /// Shown in the quick style gallery
    pub quick_format: bool,
    /// Paragraph formatting
    pub paragraph: ParagraphProperties,
    /// Run formatting
    pub text: TextProperties,
    /// Table formatting
    pub table: TableProperties,
}

impl Style {
    /// Style with no formatting
    pub fn new(id: impl Into<String>, style_type: StyleType) -> Self {
        Self {
            id: id.into(),
            name: None,
            style_type,
            based_on: None,
            next: None,
            is_default: false,
            custom: false,
            ui_priority: None,
            quick_format: false,
            paragraph: ParagraphProperties::default(),
            text: TextProperties::default(),
            table: TableProperties::default(),
        }
    }

    /// Stand-in for a style that is referenced but was never defined
    pub fn placeholder(id: &str, style_type: StyleType) -> Self {
        Self {
            name: Some(id.to_string()),
            custom: true,
            ..Self::new(id, style_type)
        }
    }

    /// Builder: set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: inherit from another style
    pub fn based_on(mut self, id: impl Into<String>) -> Self {
        self.based_on = Some(id.into());
        self
    }

    /// Builder: set paragraph formatting
    pub fn with_paragraph(mut self, props: ParagraphProperties) -> Self {
        self.paragraph = props;
        self
    }

    /// Builder: set run formatting
    pub fn with_text(mut self, props: TextProperties) -> Self {
        self.text = props;
        self
    }

    /// Builder: set table formatting
    pub fn with_table(mut self, props: TableProperties) -> Self {
        self.table = props;
        self
    }

    fn to_node(&self) -> XmlElement {
        let mut element = XmlElement::new("w:style")
            .with_attr("w:type", self.style_type)
            .with_attr("w:styleId", &self.id)
            .with_opt_attr("w:default", self.is_default.then_some("1"))
            .with_opt_attr("w:customStyle", self.custom.then_some("1"))
            .with_opt_child(self.name.as_ref().map(|n| val("w:name", n)))
            .with_opt_child(self.based_on.as_ref().map(|b| val("w:basedOn", b)))
            .with_opt_child(self.next.as_ref().map(|n| val("w:next", n)))
            .with_opt_child(self.ui_priority.map(|p| val("w:uiPriority", p)));
        if self.quick_format {
            element.push(XmlElement::new("w:qFormat"));
        }
        element
            .with_opt_child(self.paragraph.to_node())
            .with_opt_child(self.text.to_node())
            .with_opt_child(self.table.to_node())
    }

    fn from_node(element: &XmlElement) -> Option<Self> {
        let id = element.attr("w:styleId")?;
        let style_type = element
            .attr("w:type")
            .and_then(|t| t.parse().ok())
            .unwrap_or(StyleType::Paragraph);
        let read = |name: &str| {
            element
                .child(name)
                .and_then(|e| e.attr("w:val"))
                .map(str::to_string)
        };
        Some(Self {
            name: read("w:name"),
            based_on: read("w:basedOn"),
            next: read("w:next"),
            is_default: is_on(element.attr("w:default")),
            custom: is_on(element.attr("w:customStyle")),
            ui_priority: read("w:uiPriority").and_then(|p| p.parse().ok()),
            quick_format: element.child("w:qFormat").is_some(),
            paragraph: element
                .child("w:pPr")
                .map(ParagraphProperties::from_node)
                .unwrap_or_default(),
            text: element
                .child("w:rPr")
                .map(TextProperties::from_node)
                .unwrap_or_default(),
            table: TableProperties::from_node(element.child("w:tblPr"), None),
            ..Self::new(id, style_type)
        })
    }
}

/// Formatting applied before any style (`w:docDefaults`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocDefaults {
    /// Default paragraph formatting
    pub paragraph: ParagraphProperties,
    /// Default run formatting
    pub text: TextProperties,
}

impl DocDefaults {
    /// Whether neither default carries a value
    pub fn is_empty(&self) -> bool {
        self.paragraph.is_empty() && self.text.is_empty()
    }

    fn to_node(&self) -> Option<XmlElement> {
        if self.is_empty() {
            return None;
        }
        Some(
            XmlElement::new("w:docDefaults")
                .with_opt_child(
                    self.text
                        .to_node()
                        .map(|rpr| XmlElement::new("w:rPrDefault").with_child(rpr)),
                )
                .with_opt_child(
                    self.paragraph
                        .to_node()
                        .map(|ppr| XmlElement::new("w:pPrDefault").with_child(ppr)),
                ),
        )
    }

    fn from_node(element: &XmlElement) -> Self {
        Self {
            paragraph: element
                .child("w:pPrDefault")
                .and_then(|d| d.child("w:pPr"))
                .map(ParagraphProperties::from_node)
                .unwrap_or_default(),
            text: element
                .child("w:rPrDefault")
                .and_then(|d| d.child("w:rPr"))
                .map(TextProperties::from_node)
                .unwrap_or_default(),
        }
    }
}

/// Collection of styles from a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    /// Document defaults
    pub doc_defaults: DocDefaults,
    /// `w:latentStyles`, kept verbatim
    pub latent_styles: Option<XmlElement>,
    styles: Vec<Style>,
}

impl StyleSheet {
    /// Empty style sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a style; its id must not be in use
    pub fn add(&mut self, style: Style) -> Result<()> {
        if self.has(&style.id) {
            return Err(DocxError::DuplicateStyle(style.id));
        }
        self.styles.push(style);
        Ok(())
    }

    /// Get a style by ID
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Get a style by ID for modification
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Style> {
        self.styles.iter_mut().find(|s| s.id == id)
    }

    /// Get a style by ID, failing if it does not exist
    pub fn require(&self, id: &str) -> Result<&Style> {
        self.get(id)
            .ok_or_else(|| DocxError::StyleNotFound(id.to_string()))
    }

    /// Whether a style with this ID exists
    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Remove a style
    pub fn remove(&mut self, id: &str) -> Option<Style> {
        let index = self.styles.iter().position(|s| s.id == id)?;
        Some(self.styles.remove(index))
    }

    /// Number of styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.doc_defaults.is_empty() && self.latent_styles.is_none()
    }

    /// All styles in document order
    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }

    /// Styles of one type
    pub fn of_type(&self, style_type: StyleType) -> impl Iterator<Item = &Style> {
        self.styles
            .iter()
            .filter(move |s| s.style_type == style_type)
    }

    /// The style marked default for a type
    pub fn default_style(&self, style_type: StyleType) -> Option<&Style> {
        self.of_type(style_type).find(|s| s.is_default)
    }

    /// Resolve the full inheritance chain for a style, nearest first
    pub fn resolve_chain(&self, style_id: &str) -> Vec<&Style> {
        let mut chain = Vec::new();
        let mut current = style_id;
        let mut seen = HashSet::new();

        while let Some(style) = self.get(current) {
            if !seen.insert(style.id.as_str()) {
                break; // cycle
            }
            chain.push(style);
            match style.based_on {
                Some(ref base) => current = base.as_str(),
                None => break,
            }
        }

        chain
    }

    /// Heading level (1-9) of a paragraph style, inherited through
    /// `w:basedOn`
    pub fn heading_level(&self, style_id: &str) -> Option<u8> {
        self.resolve_chain(style_id)
            .into_iter()
            .find_map(|s| s.paragraph.outline_level)
            .filter(|level| *level < 9)
            .map(|level| level + 1)
    }

    /// Add a placeholder unless a style with this ID exists; returns
    /// whether one was added
    pub fn ensure_placeholder(&mut self, id: &str, style_type: StyleType) -> bool {
        if self.has(id) {
            return false;
        }
        debug!("adding placeholder {style_type} style {id:?}");
        self.styles.push(Style::placeholder(id, style_type));
        true
    }

    /// Render `w:styles`
    pub fn to_node(&self) -> XmlElement {
        let mut root = XmlElement::new("w:styles").with_opt_child(self.doc_defaults.to_node());
        if let Some(latent) = &self.latent_styles {
            root.push(latent.clone());
        }
        root.with_children(self.styles.iter().map(|s| XmlNode::Element(s.to_node())))
    }

    /// Parse `w:styles`
    pub fn from_node(root: &XmlElement) -> Self {
        let mut sheet = Self::new();
        for element in root.elements() {
            match element.name.as_str() {
                "w:docDefaults" => sheet.doc_defaults = DocDefaults::from_node(element),
                "w:latentStyles" => sheet.latent_styles = Some(element.clone()),
                "w:style" => match Style::from_node(element) {
                    Some(style) if sheet.has(&style.id) => {
                        debug!("skipping second definition of style {:?}", style.id);
                    }
                    Some(style) => sheet.styles.push(style),
                    None => debug!("skipping style without w:styleId"),
                },
                other => debug!("skipping {other} in styles part"),
            }
        }
        sheet
    }
}

fn val(name: &str, value: impl ToString) -> XmlElement {
    XmlElement::new(name).with_attr("w:val", value)
}

fn is_on(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("on"))
}
