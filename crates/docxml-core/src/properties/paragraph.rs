//! Paragraph properties (`w:pPr`)

use crate::length::Length;
use crate::xml::XmlElement;

use super::{
    non_empty, read_enum, read_parsed, read_toggle, read_val, toggle_element, val_element,
    value_enum, Change, PropertyChange, Shading,
};

value_enum! {
    /// Horizontal alignment (`w:jc`)
    pub enum Alignment {
        /// Leading edge
        Start => "start",
        /// Trailing edge
        End => "end",
        /// Left, in transitional documents
        Left => "left",
        /// Right, in transitional documents
        Right => "right",
        /// Centered
        Center => "center",
        /// Justified
        Both => "both",
        /// Distributed
        Distribute => "distribute",
    }
}

value_enum! {
    /// Interpretation of `w:spacing/@w:line`
    pub enum LineRule {
        /// 240ths of a line
        Auto => "auto",
        /// Exact height
        Exact => "exact",
        /// Minimum height
        AtLeast => "atLeast",
    }
}

/// List membership (`w:numPr`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingReference {
    /// Concrete numbering id
    pub num_id: u32,
    /// Zero-based list level
    pub level: u32,
}

/// Vertical spacing (`w:spacing`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spacing {
    /// Space above
    pub before: Option<Length>,
    /// Space below
    pub after: Option<Length>,
    /// Line height; with [`LineRule::Auto`] in 240ths of a line, stored as twips
    pub line: Option<Length>,
    /// How `line` is read
    pub line_rule: Option<LineRule>,
}

/// Indentation (`w:ind`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indentation {
    /// Leading indent
    pub start: Option<Length>,
    /// Trailing indent
    pub end: Option<Length>,
    /// Extra indent of the first line
    pub first_line: Option<Length>,
    /// Outdent of the first line
    pub hanging: Option<Length>,
}

/// Formatting of a paragraph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProperties {
    /// Paragraph style id
    pub style: Option<String>,
    /// Keep with the next paragraph
    pub keep_next: Option<bool>,
    /// Keep all lines on one page
    pub keep_lines: Option<bool>,
    /// Start on a new page
    pub page_break_before: Option<bool>,
    /// Widow and orphan control
    pub widow_control: Option<bool>,
    /// List membership
    pub numbering: Option<NumberingReference>,
    /// Background
    pub shading: Option<Shading>,
    /// Vertical spacing
    pub spacing: Option<Spacing>,
    /// Indentation
    pub indentation: Option<Indentation>,
    /// Horizontal alignment
    pub alignment: Option<Alignment>,
    /// Outline level, zero-based
    pub outline_level: Option<u8>,
    /// Tracked formatting change
    pub change: Option<Box<PropertyChange<ParagraphProperties>>>,
}

impl ParagraphProperties {
    /// Properties with only a style
    pub fn styled(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::default()
        }
    }

    /// Whether nothing is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render `w:pPr`, or `None` when empty
    pub fn to_node(&self) -> Option<XmlElement> {
        non_empty("w:pPr", self.elements())
    }

    /// Render `w:pPr` with extra trailing children (section properties),
    /// even when the bag itself is empty
    pub(crate) fn to_node_with(&self, extra: impl IntoIterator<Item = XmlElement>) -> XmlElement {
        let mut elements = self.elements();
        // w:sectPr goes before w:pPrChange
        let change = elements.pop().flatten();
        elements.extend(extra.into_iter().map(Some));
        elements.push(change);
        XmlElement::new("w:pPr").with_children(elements.into_iter().flatten().map(Into::into))
    }

    fn elements(&self) -> Vec<Option<XmlElement>> {
        vec![
            self.style.as_ref().map(|s| val_element("w:pStyle", s)),
            toggle_element("w:keepNext", self.keep_next),
            toggle_element("w:keepLines", self.keep_lines),
            toggle_element("w:pageBreakBefore", self.page_break_before),
            toggle_element("w:widowControl", self.widow_control),
            self.numbering.map(|n| {
                XmlElement::new("w:numPr")
                    .with_child(val_element("w:ilvl", n.level))
                    .with_child(val_element("w:numId", n.num_id))
            }),
            self.shading.as_ref().map(Shading::to_node),
            self.spacing.as_ref().map(|s| {
                XmlElement::new("w:spacing")
                    .with_opt_attr("w:before", s.before.map(Length::as_twip))
                    .with_opt_attr("w:after", s.after.map(Length::as_twip))
                    .with_opt_attr("w:line", s.line.map(Length::as_twip))
                    .with_opt_attr("w:lineRule", s.line_rule)
            }),
            self.indentation.as_ref().map(|i| {
                XmlElement::new("w:ind")
                    .with_opt_attr("w:start", i.start.map(Length::as_twip))
                    .with_opt_attr("w:end", i.end.map(Length::as_twip))
                    .with_opt_attr("w:firstLine", i.first_line.map(Length::as_twip))
                    .with_opt_attr("w:hanging", i.hanging.map(Length::as_twip))
            }),
            self.alignment.map(|a| val_element("w:jc", a)),
            self.outline_level.map(|l| val_element("w:outlineLvl", l)),
            self.change.as_ref().map(|change| {
                let previous = XmlElement::new("w:pPr").with_children(
                    change
                        .previous
                        .elements()
                        .into_iter()
                        .flatten()
                        .map(Into::into),
                );
                change
                    .change
                    .apply(XmlElement::new("w:pPrChange"))
                    .with_child(previous)
            }),
        ]
    }

    /// Parse `w:pPr`; section properties inside it are not read here
    pub fn from_node(element: &XmlElement) -> Self {
        let twips = |node: &XmlElement, name: &str| node.attr_parsed::<i64>(name).map(Length::twip);

        Self {
            style: read_val(element, "w:pStyle").map(str::to_string),
            keep_next: read_toggle(element, "w:keepNext"),
            keep_lines: read_toggle(element, "w:keepLines"),
            page_break_before: read_toggle(element, "w:pageBreakBefore"),
            widow_control: read_toggle(element, "w:widowControl"),
            numbering: element.child("w:numPr").and_then(|num| {
                Some(NumberingReference {
                    num_id: read_parsed(num, "w:numId")?,
                    level: read_parsed(num, "w:ilvl").unwrap_or(0),
                })
            }),
            shading: element.child("w:shd").map(Shading::from_node),
            spacing: element.child("w:spacing").map(|s| Spacing {
                before: twips(s, "w:before"),
                after: twips(s, "w:after"),
                line: twips(s, "w:line"),
                line_rule: s.attr("w:lineRule").and_then(|r| r.parse().ok()),
            }),
            indentation: element.child("w:ind").map(|i| Indentation {
                start: twips(i, "w:start").or_else(|| twips(i, "w:left")),
                end: twips(i, "w:end").or_else(|| twips(i, "w:right")),
                first_line: twips(i, "w:firstLine"),
                hanging: twips(i, "w:hanging"),
            }),
            alignment: read_enum(element, "w:jc"),
            outline_level: read_parsed(element, "w:outlineLvl"),
            change: element.child("w:pPrChange").and_then(|node| {
                let change = Change::from_node(node)?;
                let previous = node
                    .child("w:pPr")
                    .map(ParagraphProperties::from_node)
                    .unwrap_or_default();
                Some(Box::new(PropertyChange { change, previous }))
            }),
        }
    }
}
