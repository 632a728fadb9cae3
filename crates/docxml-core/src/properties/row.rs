//! Table row properties (`w:trPr`)

use crate::length::Length;
use crate::xml::XmlElement;

use crate::table_model::MAX_GRID_SPAN;

use super::{non_empty, read_parsed, read_toggle, toggle_element, val_element, value_enum, Change};

value_enum! {
    /// Interpretation of a row height
    pub enum HeightRule {
        /// Content decides
        Auto => "auto",
        /// Fixed height
        Exact => "exact",
        /// Minimum height
        AtLeast => "atLeast",
    }
}

/// Row height (`w:trHeight`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHeight {
    /// Height
    pub value: Length,
    /// How the height applies
    pub rule: Option<HeightRule>,
}

/// Formatting of a table row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowProperties {
    /// Grid columns left empty before the first cell
    pub grid_before: usize,
    /// Grid columns left empty after the last cell
    pub grid_after: usize,
    /// Do not break the row across pages
    pub cant_split: Option<bool>,
    /// Row height
    pub height: Option<RowHeight>,
    /// Repeat as header row on every page
    pub header: Option<bool>,
    /// Row insertion tracked as a change
    pub insertion: Option<Change>,
    /// Row deletion tracked as a change
    pub deletion: Option<Change>,
}

impl RowProperties {
    /// Render `w:trPr`, or `None` when empty
    pub fn to_node(&self) -> Option<XmlElement> {
        non_empty(
            "w:trPr",
            [
                (self.grid_before > 0).then(|| val_element("w:gridBefore", self.grid_before)),
                (self.grid_after > 0).then(|| val_element("w:gridAfter", self.grid_after)),
                toggle_element("w:cantSplit", self.cant_split),
                self.height.map(|h| {
                    XmlElement::new("w:trHeight")
                        .with_attr("w:val", h.value.as_twip())
                        .with_opt_attr("w:hRule", h.rule)
                }),
                toggle_element("w:tblHeader", self.header),
                self.insertion
                    .as_ref()
                    .map(|c| c.apply(XmlElement::new("w:ins"))),
                self.deletion
                    .as_ref()
                    .map(|c| c.apply(XmlElement::new("w:del"))),
            ],
        )
    }

    /// Parse `w:trPr`
    pub fn from_node(element: &XmlElement) -> Self {
        let grid = |name: &str| read_parsed::<usize>(element, name).unwrap_or(0).min(MAX_GRID_SPAN);
        Self {
            grid_before: grid("w:gridBefore"),
            grid_after: grid("w:gridAfter"),
            cant_split: read_toggle(element, "w:cantSplit"),
            height: element.child("w:trHeight").and_then(|h| {
                Some(RowHeight {
                    value: Length::twip(h.attr_parsed("w:val")?),
                    rule: h.attr("w:hRule").and_then(|r| r.parse().ok()),
                })
            }),
            header: read_toggle(element, "w:tblHeader"),
            insertion: element.child("w:ins").and_then(Change::from_node),
            deletion: element.child("w:del").and_then(Change::from_node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let props = RowProperties {
            grid_before: 1,
            grid_after: 0,
            cant_split: Some(true),
            height: Some(RowHeight {
                value: Length::twip(400),
                rule: Some(HeightRule::AtLeast),
            }),
            header: Some(true),
            insertion: Some(Change::new(12, "Ada")),
            deletion: None,
        };
        let node = props.to_node().unwrap();
        assert_eq!(RowProperties::from_node(&node), props);
    }

    #[test]
    fn test_grid_skips_are_capped() {
        let node = XmlElement::new("w:trPr")
            .with_child(val_element("w:gridBefore", "2"))
            .with_child(val_element("w:gridAfter", "30000000"));
        let props = RowProperties::from_node(&node);
        assert_eq!(props.grid_before, 2);
        assert_eq!(props.grid_after, MAX_GRID_SPAN);
    }
}
