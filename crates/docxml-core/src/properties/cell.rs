//! Table cell properties (`w:tcPr`)
//!
//! Spans are stored as counts. `w:gridSpan` and `w:vMerge` are derived from
//! the table layout model when the cell is rendered.

use crate::table_model::MAX_GRID_SPAN;
use crate::xml::XmlElement;

use super::{read_enum, read_parsed, read_toggle, toggle_element, val_element, value_enum, Shading, TableWidth};

value_enum! {
    /// Vertical alignment of cell content
    pub enum CellAlignment {
        /// Top
        Top => "top",
        /// Middle
        Center => "center",
        /// Bottom
        Bottom => "bottom",
    }
}

value_enum! {
    /// `w:vMerge` marker as found in a document
    pub enum VerticalMerge {
        /// First cell of a vertical merge
        Restart => "restart",
        /// Covered by the cell above
        Continue => "continue",
    }
}

/// Formatting and span intent of a table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellProperties {
    /// Preferred width; derived from the table grid when absent
    pub width: Option<TableWidth>,
    /// Columns covered
    pub col_span: usize,
    /// Rows covered
    pub row_span: usize,
    /// Background
    pub shading: Option<Shading>,
    /// Vertical alignment
    pub vertical_align: Option<CellAlignment>,
    /// Prevent wrapping
    pub no_wrap: Option<bool>,
}

impl Default for CellProperties {
    fn default() -> Self {
        Self {
            width: None,
            col_span: 1,
            row_span: 1,
            shading: None,
            vertical_align: None,
            no_wrap: None,
        }
    }
}

impl CellProperties {
    /// Render `w:tcPr` with the placement decided by the layout model
    pub fn to_node(
        &self,
        width: Option<TableWidth>,
        col_span: usize,
        merge: Option<VerticalMerge>,
    ) -> Option<XmlElement> {
        super::non_empty(
            "w:tcPr",
            [
                self.width.or(width).map(|w| w.to_node("w:tcW")),
                (col_span > 1).then(|| val_element("w:gridSpan", col_span)),
                merge.map(|m| val_element("w:vMerge", m)),
                self.shading.as_ref().map(Shading::to_node),
                toggle_element("w:noWrap", self.no_wrap),
                self.vertical_align.map(|v| val_element("w:vAlign", v)),
            ],
        )
    }

    /// Parse `w:tcPr`; the row span is reconstructed by the table and the
    /// column span is capped at [`MAX_GRID_SPAN`]
    pub fn from_node(element: &XmlElement) -> Self {
        Self {
            width: element.child("w:tcW").and_then(TableWidth::from_node),
            col_span: read_parsed::<usize>(element, "w:gridSpan")
                .unwrap_or(1)
                .clamp(1, MAX_GRID_SPAN),
            row_span: 1,
            shading: element.child("w:shd").map(Shading::from_node),
            vertical_align: read_enum(element, "w:vAlign"),
            no_wrap: read_toggle(element, "w:noWrap"),
        }
    }

    /// Read the `w:vMerge` marker; a bare element means `continue`
    pub fn merge_of(element: &XmlElement) -> Option<VerticalMerge> {
        let merge = element.child("w:vMerge")?;
        Some(match merge.attr("w:val") {
            Some("restart") => VerticalMerge::Restart,
            _ => VerticalMerge::Continue,
        })
    }
}
