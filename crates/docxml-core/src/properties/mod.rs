//! Property bag codecs
//!
//! Each bag maps to one OOXML property element (`w:pPr`, `w:rPr`,
//! `w:tblPr`, `w:trPr`, `w:tcPr`, `w:sectPr`). Rendering returns `None`
//! when nothing is set, so that components can omit the element.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone};

use crate::xml::XmlElement;

/// Declare a closed set of `w:val` strings
macro_rules! value_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Attribute value
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $value ),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::DocxError;

            fn from_str(value: &str) -> crate::error::Result<Self> {
                match value {
                    $( $value => Ok(Self::$variant), )+
                    other => Err(crate::error::DocxError::InvalidValue {
                        attribute: stringify!($name).to_string(),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
pub(crate) use value_enum;

mod cell;
mod paragraph;
mod row;
mod section;
mod table;
mod text;

pub use cell::{CellAlignment, CellProperties, VerticalMerge};
pub use paragraph::{Alignment, Indentation, LineRule, NumberingReference, ParagraphProperties, Spacing};
pub use row::{HeightRule, RowHeight, RowProperties};
pub use section::{
    HeaderFooterKind, HeaderFooterRef, HeaderFooterSlots, Orientation, PageMargins, SectionProperties,
    SectionType,
};
pub use table::{Border, TableBorders, TableLayout, TableProperties, TableWidth, WidthType};
pub use text::{TextProperties, VerticalAlign};

/// Timestamp of a tracked change (`w:date`)
///
/// Written back with the precision and offset it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeDate {
    /// Date with a UTC offset
    Zoned(DateTime<FixedOffset>),
    /// Date without an offset
    Local(NaiveDateTime),
    /// Text that is not a date
    Raw(String),
}

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl ChangeDate {
    /// Read an attribute value
    pub fn parse(raw: &str) -> Self {
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Self::Zoned(date);
        }
        match NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT) {
            Ok(date) => Self::Local(date),
            Err(err) => {
                log::warn!("keeping unparsable change date {raw:?} as text: {err}");
                Self::Raw(raw.to_string())
            }
        }
    }

    /// Attribute value
    pub fn to_attr(&self) -> String {
        match self {
            Self::Zoned(date) => date.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::Local(date) => date.format(LOCAL_FORMAT).to_string(),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for ChangeDate {
    fn from(date: DateTime<Tz>) -> Self {
        Self::Zoned(date.fixed_offset())
    }
}

impl From<NaiveDateTime> for ChangeDate {
    fn from(date: NaiveDateTime) -> Self {
        Self::Local(date)
    }
}

/// Tracked-change metadata
///
/// Ids are supplied by the caller and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Revision id
    pub id: u32,
    /// Author display name
    pub author: String,
    /// Time of the change
    pub date: Option<ChangeDate>,
}

impl Change {
    /// Change by `author` with no date
    pub fn new(id: u32, author: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
            date: None,
        }
    }

    /// Builder: set the date
    pub fn with_date(mut self, date: impl Into<ChangeDate>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Add `w:id`, `w:author` and `w:date` to an element
    pub fn apply(&self, element: XmlElement) -> XmlElement {
        element
            .with_attr("w:id", self.id)
            .with_attr("w:author", &self.author)
            .with_opt_attr("w:date", self.date.as_ref().map(ChangeDate::to_attr))
    }

    /// Read the change attributes of an element
    pub fn from_node(element: &XmlElement) -> Option<Self> {
        let id = element.attr_parsed("w:id")?;
        let author = element.attr("w:author").unwrap_or_default().to_string();
        let date = element.attr("w:date").map(ChangeDate::parse);
        Some(Self { id, author, date })
    }
}

/// A property bag as it was before a tracked change
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange<P> {
    /// Who changed the properties, and when
    pub change: Change,
    /// Properties before the change
    pub previous: P,
}

/// Shading (`w:shd`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shading {
    /// Pattern, `clear` for a plain fill
    pub pattern: String,
    /// Pattern color
    pub color: Option<String>,
    /// Fill color
    pub fill: Option<String>,
}

impl Shading {
    /// Solid background fill
    pub fn fill(color: impl Into<String>) -> Self {
        Self {
            pattern: "clear".to_string(),
            color: Some("auto".to_string()),
            fill: Some(color.into()),
        }
    }

    pub(crate) fn to_node(&self) -> XmlElement {
        XmlElement::new("w:shd")
            .with_attr("w:val", &self.pattern)
            .with_opt_attr("w:color", self.color.as_ref())
            .with_opt_attr("w:fill", self.fill.as_ref())
    }

    pub(crate) fn from_node(element: &XmlElement) -> Self {
        Self {
            pattern: element.attr("w:val").unwrap_or("clear").to_string(),
            color: element.attr("w:color").map(str::to_string),
            fill: element.attr("w:fill").map(str::to_string),
        }
    }
}

/// `<name w:val="..."/>`
pub(crate) fn val_element(name: &str, value: impl ToString) -> XmlElement {
    XmlElement::new(name).with_attr("w:val", value)
}

/// On/off property: absent, `<name/>` for on, `<name w:val="0"/>` for off
pub(crate) fn toggle_element(name: &str, value: Option<bool>) -> Option<XmlElement> {
    match value {
        Some(true) => Some(XmlElement::new(name)),
        Some(false) => Some(val_element(name, "0")),
        None => None,
    }
}

/// Read an on/off property
pub(crate) fn read_toggle(parent: &XmlElement, name: &str) -> Option<bool> {
    let element = parent.child(name)?;
    Some(!matches!(
        element.attr("w:val"),
        Some("0") | Some("false") | Some("off")
    ))
}

/// Read `w:val` of a child element
pub(crate) fn read_val<'a>(parent: &'a XmlElement, name: &str) -> Option<&'a str> {
    parent.child(name).and_then(|e| e.attr("w:val"))
}

/// Read and parse `w:val` of a child element
pub(crate) fn read_parsed<T: std::str::FromStr>(parent: &XmlElement, name: &str) -> Option<T> {
    parent.child(name).and_then(|e| e.attr_parsed("w:val"))
}

/// Read `w:val` of a child element into a value enum, ignoring unknown values
pub(crate) fn read_enum<T: std::str::FromStr>(parent: &XmlElement, name: &str) -> Option<T> {
    let raw = read_val(parent, name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!("ignoring unknown {name} value {raw:?}");
            None
        }
    }
}

/// Collect child elements into `parent`, returning `None` if there are none
pub(crate) fn non_empty(
    name: &str,
    children: impl IntoIterator<Item = Option<XmlElement>>,
) -> Option<XmlElement> {
    let element = XmlElement::new(name).with_children(
        children
            .into_iter()
            .flatten()
            .map(crate::xml::XmlNode::Element),
    );
    if element.children.is_empty() {
        None
    } else {
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_change_round_trip() {
        let change = Change::new(7, "Ada").with_date(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let element = change.apply(XmlElement::new("w:ins"));
        assert_eq!(element.attr("w:date"), Some("2024-03-01T12:00:00Z"));
        assert_eq!(Change::from_node(&element), Some(change));
    }

    #[test]
    fn test_change_dates_are_written_as_read() {
        for raw in [
            "2024-05-01T10:00:00.123Z",
            "2024-05-01T10:00:00+02:00",
            "2024-05-01T10:00:00",
        ] {
            let element = XmlElement::new("w:ins")
                .with_attr("w:id", 1)
                .with_attr("w:author", "Ada")
                .with_attr("w:date", raw);
            let change = Change::from_node(&element).unwrap();
            assert!(!matches!(change.date, Some(ChangeDate::Raw(_))), "{raw}");
            let written = change.apply(XmlElement::new("w:ins"));
            assert_eq!(written.attr("w:date"), Some(raw));
        }
    }

    #[test]
    fn test_offset_is_kept() {
        let date = ChangeDate::parse("2024-05-01T10:00:00+02:00");
        let ChangeDate::Zoned(zoned) = date else {
            panic!("expected a zoned date, got {date:?}");
        };
        assert_eq!(zoned.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_change_with_bad_date_keeps_text() {
        let element = XmlElement::new("w:del")
            .with_attr("w:id", 3)
            .with_attr("w:author", "Bo")
            .with_attr("w:date", "yesterday");
        let change = Change::from_node(&element).unwrap();
        assert_eq!(change.id, 3);
        assert_eq!(change.date, Some(ChangeDate::Raw("yesterday".into())));
        let written = change.apply(XmlElement::new("w:del"));
        assert_eq!(written.attr("w:date"), Some("yesterday"));
    }

    #[test]
    fn test_toggle_values() {
        let parent = XmlElement::new("w:rPr")
            .with_child(XmlElement::new("w:b"))
            .with_child(val_element("w:i", "0"))
            .with_child(val_element("w:caps", "true"));
        assert_eq!(read_toggle(&parent, "w:b"), Some(true));
        assert_eq!(read_toggle(&parent, "w:i"), Some(false));
        assert_eq!(read_toggle(&parent, "w:caps"), Some(true));
        assert_eq!(read_toggle(&parent, "w:strike"), None);
    }

    #[test]
    fn test_non_empty() {
        assert!(non_empty("w:pPr", [None, None]).is_none());
        let element = non_empty("w:pPr", [None, Some(XmlElement::new("w:keepNext"))]).unwrap();
        assert_eq!(element.children.len(), 1);
    }
}
