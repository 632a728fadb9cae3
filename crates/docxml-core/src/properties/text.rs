//! Run properties (`w:rPr`)

use crate::length::Length;
use crate::xml::XmlElement;

use super::{
    non_empty, read_enum, read_parsed, read_toggle, read_val, toggle_element, val_element,
    value_enum, Change, PropertyChange,
};

value_enum! {
    /// Baseline shift (`w:vertAlign`)
    pub enum VerticalAlign {
        /// Regular baseline
        Baseline => "baseline",
        /// Raised, smaller text
        Superscript => "superscript",
        /// Lowered, smaller text
        Subscript => "subscript",
    }
}

/// Formatting of a text run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextProperties {
    /// Character style id
    pub style: Option<String>,
    /// Font family, applied to every script slot
    pub font: Option<String>,
    /// Bold
    pub bold: Option<bool>,
    /// Italic
    pub italic: Option<bool>,
    /// All capitals
    pub caps: Option<bool>,
    /// Small capitals
    pub small_caps: Option<bool>,
    /// Single strikethrough
    pub strike: Option<bool>,
    /// Hidden text
    pub vanish: Option<bool>,
    /// Text color, hex RGB or `auto`
    pub color: Option<String>,
    /// Font size
    pub size: Option<Length>,
    /// Highlight color name
    pub highlight: Option<String>,
    /// Underline pattern (`single`, `double` ...)
    pub underline: Option<String>,
    /// Superscript or subscript
    pub vertical_align: Option<VerticalAlign>,
    /// Language tag
    pub language: Option<String>,
    /// Tracked formatting change
    pub change: Option<Box<PropertyChange<TextProperties>>>,
}

impl TextProperties {
    /// Whether nothing is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render `w:rPr`, or `None` when empty
    pub fn to_node(&self) -> Option<XmlElement> {
        non_empty("w:rPr", self.elements())
    }

    fn elements(&self) -> Vec<Option<XmlElement>> {
        vec![
            self.style.as_ref().map(|s| val_element("w:rStyle", s)),
            self.font.as_ref().map(|font| {
                XmlElement::new("w:rFonts")
                    .with_attr("w:ascii", font)
                    .with_attr("w:hAnsi", font)
                    .with_attr("w:eastAsia", font)
                    .with_attr("w:cs", font)
            }),
            toggle_element("w:b", self.bold),
            toggle_element("w:i", self.italic),
            toggle_element("w:caps", self.caps),
            toggle_element("w:smallCaps", self.small_caps),
            toggle_element("w:strike", self.strike),
            toggle_element("w:vanish", self.vanish),
            self.color.as_ref().map(|c| val_element("w:color", c)),
            self.size.map(|s| val_element("w:sz", s.as_half_points())),
            self.size.map(|s| val_element("w:szCs", s.as_half_points())),
            self.highlight.as_ref().map(|h| val_element("w:highlight", h)),
            self.underline.as_ref().map(|u| val_element("w:u", u)),
            self.vertical_align.map(|v| val_element("w:vertAlign", v)),
            self.language.as_ref().map(|l| val_element("w:lang", l)),
            self.change.as_ref().map(|change| {
                let previous = XmlElement::new("w:rPr").with_children(
                    change
                        .previous
                        .elements()
                        .into_iter()
                        .flatten()
                        .map(Into::into),
                );
                change
                    .change
                    .apply(XmlElement::new("w:rPrChange"))
                    .with_child(previous)
            }),
        ]
    }

    /// Parse `w:rPr`
    pub fn from_node(element: &XmlElement) -> Self {
        Self {
            style: read_val(element, "w:rStyle").map(str::to_string),
            font: element.child("w:rFonts").and_then(|fonts| {
                fonts
                    .attr("w:ascii")
                    .or_else(|| fonts.attr("w:hAnsi"))
                    .map(str::to_string)
            }),
            bold: read_toggle(element, "w:b"),
            italic: read_toggle(element, "w:i"),
            caps: read_toggle(element, "w:caps"),
            small_caps: read_toggle(element, "w:smallCaps"),
            strike: read_toggle(element, "w:strike"),
            vanish: read_toggle(element, "w:vanish"),
            color: read_val(element, "w:color").map(str::to_string),
            size: read_parsed(element, "w:sz").map(Length::half_points),
            highlight: read_val(element, "w:highlight").map(str::to_string),
            underline: read_val(element, "w:u").map(str::to_string),
            vertical_align: read_enum(element, "w:vertAlign"),
            language: read_val(element, "w:lang").map(str::to_string),
            change: element.child("w:rPrChange").and_then(|node| {
                let change = Change::from_node(node)?;
                let previous = node
                    .child("w:rPr")
                    .map(TextProperties::from_node)
                    .unwrap_or_default();
                Some(Box::new(PropertyChange { change, previous }))
            }),
        }
    }
}
