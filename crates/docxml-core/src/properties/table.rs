//! Table properties (`w:tblPr`)

use crate::length::Length;
use crate::xml::XmlElement;

use super::{non_empty, read_enum, read_val, val_element, value_enum, Alignment};

value_enum! {
    /// Unit of a table or cell width
    pub enum WidthType {
        /// Automatic
        Auto => "auto",
        /// Twentieths of a point
        Dxa => "dxa",
        /// Fiftieths of a percent
        Pct => "pct",
        /// Zero width
        Nil => "nil",
    }
}

value_enum! {
    /// Table layout algorithm
    pub enum TableLayout {
        /// Column widths from the grid
        Fixed => "fixed",
        /// Column widths from the content
        Autofit => "autofit",
    }
}

/// A width with its unit (`w:tblW`, `w:tcW`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWidth {
    /// Raw value in `unit`
    pub value: i64,
    /// Unit
    pub unit: WidthType,
}

impl TableWidth {
    /// Absolute width
    pub fn length(length: Length) -> Self {
        Self {
            value: length.as_twip(),
            unit: WidthType::Dxa,
        }
    }

    /// Percentage of the available width
    pub fn percent(percent: f64) -> Self {
        Self {
            value: (percent * 50.0).round() as i64,
            unit: WidthType::Pct,
        }
    }

    /// Automatic width
    pub fn auto() -> Self {
        Self {
            value: 0,
            unit: WidthType::Auto,
        }
    }

    pub(crate) fn to_node(self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .with_attr("w:w", self.value)
            .with_attr("w:type", self.unit)
    }

    pub(crate) fn from_node(element: &XmlElement) -> Option<Self> {
        Some(Self {
            value: element.attr_parsed("w:w").unwrap_or(0),
            unit: element
                .attr("w:type")
                .and_then(|t| t.parse().ok())
                .unwrap_or(WidthType::Dxa),
        })
    }
}

/// One border edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    /// Line style (`single`, `double`, `none` ...)
    pub style: String,
    /// Width in eighths of a point
    pub size: u32,
    /// Line color
    pub color: Option<String>,
    /// Padding in points
    pub space: u32,
}

impl Border {
    /// Thin single line
    pub fn single() -> Self {
        Self {
            style: "single".to_string(),
            size: 4,
            color: Some("auto".to_string()),
            space: 0,
        }
    }

    fn to_node(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .with_attr("w:val", &self.style)
            .with_attr("w:sz", self.size)
            .with_attr("w:space", self.space)
            .with_opt_attr("w:color", self.color.as_ref())
    }

    fn from_node(element: &XmlElement) -> Self {
        Self {
            style: element.attr("w:val").unwrap_or("single").to_string(),
            size: element.attr_parsed("w:sz").unwrap_or(4),
            color: element.attr("w:color").map(str::to_string),
            space: element.attr_parsed("w:space").unwrap_or(0),
        }
    }
}

/// Table borders (`w:tblBorders`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBorders {
    /// Top edge
    pub top: Option<Border>,
    /// Leading edge
    pub start: Option<Border>,
    /// Bottom edge
    pub bottom: Option<Border>,
    /// Trailing edge
    pub end: Option<Border>,
    /// Between rows
    pub inside_h: Option<Border>,
    /// Between columns
    pub inside_v: Option<Border>,
}

impl TableBorders {
    /// The same border on every edge
    pub fn all(border: Border) -> Self {
        Self {
            top: Some(border.clone()),
            start: Some(border.clone()),
            bottom: Some(border.clone()),
            end: Some(border.clone()),
            inside_h: Some(border.clone()),
            inside_v: Some(border),
        }
    }

    fn to_node(&self) -> Option<XmlElement> {
        non_empty(
            "w:tblBorders",
            [
                self.top.as_ref().map(|b| b.to_node("w:top")),
                self.start.as_ref().map(|b| b.to_node("w:start")),
                self.bottom.as_ref().map(|b| b.to_node("w:bottom")),
                self.end.as_ref().map(|b| b.to_node("w:end")),
                self.inside_h.as_ref().map(|b| b.to_node("w:insideH")),
                self.inside_v.as_ref().map(|b| b.to_node("w:insideV")),
            ],
        )
    }

    fn from_node(element: &XmlElement) -> Self {
        let edge = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| element.child(name))
                .map(Border::from_node)
        };
        Self {
            top: edge(&["w:top"]),
            start: edge(&["w:start", "w:left"]),
            bottom: edge(&["w:bottom"]),
            end: edge(&["w:end", "w:right"]),
            inside_h: edge(&["w:insideH"]),
            inside_v: edge(&["w:insideV"]),
        }
    }
}

/// Formatting of a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableProperties {
    /// Table style id
    pub style: Option<String>,
    /// Preferred width
    pub width: Option<TableWidth>,
    /// Horizontal alignment
    pub alignment: Option<Alignment>,
    /// Leading indent
    pub indentation: Option<Length>,
    /// Borders
    pub borders: Option<TableBorders>,
    /// Layout algorithm
    pub layout: Option<TableLayout>,
    /// Accessible caption
    pub caption: Option<String>,
    /// Accessible description
    pub description: Option<String>,
    /// Grid column widths (`w:tblGrid`)
    pub columns: Vec<Length>,
}

impl TableProperties {
    /// Render `w:tblPr`, or `None` when empty; columns are rendered by the
    /// table as `w:tblGrid`
    pub fn to_node(&self) -> Option<XmlElement> {
        non_empty(
            "w:tblPr",
            [
                self.style.as_ref().map(|s| val_element("w:tblStyle", s)),
                self.width.map(|w| w.to_node("w:tblW")),
                self.alignment.map(|a| val_element("w:jc", a)),
                self.indentation
                    .map(|i| TableWidth::length(i).to_node("w:tblInd")),
                self.borders.as_ref().and_then(TableBorders::to_node),
                self.layout
                    .map(|l| XmlElement::new("w:tblLayout").with_attr("w:type", l)),
                self.caption.as_ref().map(|c| val_element("w:tblCaption", c)),
                self.description
                    .as_ref()
                    .map(|d| val_element("w:tblDescription", d)),
            ],
        )
    }

    /// Parse `w:tblPr` and the sibling `w:tblGrid`
    pub fn from_node(properties: Option<&XmlElement>, grid: Option<&XmlElement>) -> Self {
        let mut props = match properties {
            Some(element) => Self {
                style: read_val(element, "w:tblStyle").map(str::to_string),
                width: element.child("w:tblW").and_then(TableWidth::from_node),
                alignment: read_enum(element, "w:jc"),
                indentation: element
                    .child("w:tblInd")
                    .and_then(|i| i.attr_parsed::<i64>("w:w"))
                    .map(Length::twip),
                borders: element.child("w:tblBorders").map(TableBorders::from_node),
                layout: element
                    .child("w:tblLayout")
                    .and_then(|l| l.attr("w:type"))
                    .and_then(|t| t.parse().ok()),
                caption: read_val(element, "w:tblCaption").map(str::to_string),
                description: read_val(element, "w:tblDescription").map(str::to_string),
                columns: Vec::new(),
            },
            None => Self::default(),
        };
        // A grid is only kept when every column has a width
        if let Some(grid) = grid {
            props.columns = grid
                .children_named("w:gridCol")
                .map(|col| col.attr_parsed::<i64>("w:w").map(Length::twip))
                .collect::<Option<Vec<_>>>()
                .unwrap_or_default();
        }
        props
    }
}
