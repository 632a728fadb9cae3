//! Section properties (`w:sectPr`)

use crate::components::Node;
use crate::error::{DocxError, Result};
use crate::length::Length;
use crate::relationships::RelationshipType;
use crate::xml::XmlElement;

use super::{read_enum, read_toggle, toggle_element, val_element, value_enum};

value_enum! {
    /// How a section starts
    pub enum SectionType {
        /// On a new page
        NextPage => "nextPage",
        /// On the same page
        Continuous => "continuous",
        /// On the next even page
        EvenPage => "evenPage",
        /// On the next odd page
        OddPage => "oddPage",
        /// In the next column
        NextColumn => "nextColumn",
    }
}

value_enum! {
    /// Page orientation
    pub enum Orientation {
        /// Taller than wide
        Portrait => "portrait",
        /// Wider than tall
        Landscape => "landscape",
    }
}

/// Header or footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFooterKind {
    /// Page header
    Header,
    /// Page footer
    Footer,
}

impl HeaderFooterKind {
    /// Root element of the part
    pub fn root_element(self) -> &'static str {
        match self {
            Self::Header => "w:hdr",
            Self::Footer => "w:ftr",
        }
    }

    /// Reference element inside `w:sectPr`
    pub fn reference_element(self) -> &'static str {
        match self {
            Self::Header => "w:headerReference",
            Self::Footer => "w:footerReference",
        }
    }

    /// Relationship type of the part
    pub fn relationship_type(self) -> RelationshipType {
        match self {
            Self::Header => RelationshipType::Header,
            Self::Footer => RelationshipType::Footer,
        }
    }

    /// File name stem (`header` for `word/header1.xml`)
    pub fn stem(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Footer => "footer",
        }
    }
}

/// Content of a header or footer slot
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderFooterRef {
    /// Content not yet stored in its own part; linked during the
    /// relationship pre-walk
    Content(Vec<Node>),
    /// Relationship id of an existing part
    Linked(String),
}

/// The three header (or footer) slots of a section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderFooterSlots {
    /// Every page not covered by another slot
    pub default: Option<HeaderFooterRef>,
    /// First page, when the section has a title page
    pub first: Option<HeaderFooterRef>,
    /// Even pages, when the document distinguishes even and odd pages
    pub even: Option<HeaderFooterRef>,
}

impl HeaderFooterSlots {
    /// Slots with their `w:type` value
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &HeaderFooterRef)> {
        [
            ("default", &self.default),
            ("first", &self.first),
            ("even", &self.even),
        ]
        .into_iter()
        .filter_map(|(kind, slot)| slot.as_ref().map(|s| (kind, s)))
    }

    /// Mutable slots with their `w:type` value
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&'static str, &mut HeaderFooterRef)> {
        [
            ("default", &mut self.default),
            ("first", &mut self.first),
            ("even", &mut self.even),
        ]
        .into_iter()
        .filter_map(|(kind, slot)| slot.as_mut().map(|s| (kind, s)))
    }

    fn slot_mut(&mut self, kind: &str) -> Option<&mut Option<HeaderFooterRef>> {
        match kind {
            "default" => Some(&mut self.default),
            "first" => Some(&mut self.first),
            "even" => Some(&mut self.even),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Page margins (`w:pgMar`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMargins {
    /// Top margin
    pub top: Length,
    /// Right margin
    pub right: Length,
    /// Bottom margin
    pub bottom: Length,
    /// Left margin
    pub left: Length,
    /// Distance of the header from the page edge
    pub header: Length,
    /// Distance of the footer from the page edge
    pub footer: Length,
    /// Binding gutter
    pub gutter: Length,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            top: Length::inch(1.0),
            right: Length::inch(1.0),
            bottom: Length::inch(1.0),
            left: Length::inch(1.0),
            header: Length::twip(720),
            footer: Length::twip(720),
            gutter: Length::ZERO,
        }
    }
}

/// Page setup and header/footer references of a section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionProperties {
    /// Header slots
    pub headers: HeaderFooterSlots,
    /// Footer slots
    pub footers: HeaderFooterSlots,
    /// Section start
    pub section_type: Option<SectionType>,
    /// Page width
    pub page_width: Option<Length>,
    /// Page height
    pub page_height: Option<Length>,
    /// Orientation
    pub orientation: Option<Orientation>,
    /// Margins
    pub margins: Option<PageMargins>,
    /// Distinct first page header and footer
    pub title_page: Option<bool>,
}

impl SectionProperties {
    /// Slots of one kind
    pub fn slots(&self, kind: HeaderFooterKind) -> &HeaderFooterSlots {
        match kind {
            HeaderFooterKind::Header => &self.headers,
            HeaderFooterKind::Footer => &self.footers,
        }
    }

    /// Mutable slots of one kind
    pub fn slots_mut(&mut self, kind: HeaderFooterKind) -> &mut HeaderFooterSlots {
        match kind {
            HeaderFooterKind::Header => &mut self.headers,
            HeaderFooterKind::Footer => &mut self.footers,
        }
    }

    /// Render `w:sectPr`; every header and footer must be linked
    pub fn to_node(&self) -> Result<XmlElement> {
        let mut element = XmlElement::new("w:sectPr");

        for kind in [HeaderFooterKind::Header, HeaderFooterKind::Footer] {
            for (slot, reference) in self.slots(kind).iter() {
                match reference {
                    HeaderFooterRef::Linked(id) => element.push(
                        XmlElement::new(kind.reference_element())
                            .with_attr("w:type", slot)
                            .with_attr("r:id", id),
                    ),
                    HeaderFooterRef::Content(_) => {
                        return Err(DocxError::InvalidStructure(format!(
                            "{} content for the {slot} slot was not linked to a part",
                            kind.stem()
                        )))
                    }
                }
            }
        }

        if let Some(section_type) = self.section_type {
            element.push(val_element("w:type", section_type));
        }
        if self.page_width.is_some() || self.page_height.is_some() || self.orientation.is_some() {
            element.push(
                XmlElement::new("w:pgSz")
                    .with_opt_attr("w:w", self.page_width.map(Length::as_twip))
                    .with_opt_attr("w:h", self.page_height.map(Length::as_twip))
                    .with_opt_attr("w:orient", self.orientation),
            );
        }
        if let Some(m) = self.margins {
            element.push(
                XmlElement::new("w:pgMar")
                    .with_attr("w:top", m.top.as_twip())
                    .with_attr("w:right", m.right.as_twip())
                    .with_attr("w:bottom", m.bottom.as_twip())
                    .with_attr("w:left", m.left.as_twip())
                    .with_attr("w:header", m.header.as_twip())
                    .with_attr("w:footer", m.footer.as_twip())
                    .with_attr("w:gutter", m.gutter.as_twip()),
            );
        }

        // A first-page header only shows when the section has a title page
        let title_page = self.title_page.or_else(|| {
            (self.headers.first.is_some() || self.footers.first.is_some()).then_some(true)
        });
        if let Some(title_page) = toggle_element("w:titlePg", title_page) {
            element.push(title_page);
        }

        Ok(element)
    }

    /// Parse `w:sectPr`
    pub fn from_node(element: &XmlElement) -> Self {
        let mut props = Self {
            section_type: read_enum(element, "w:type"),
            title_page: read_toggle(element, "w:titlePg"),
            ..Self::default()
        };

        for kind in [HeaderFooterKind::Header, HeaderFooterKind::Footer] {
            for reference in element.children_named(kind.reference_element()) {
                let slot = reference.attr("w:type").unwrap_or("default");
                let target = props.slots_mut(kind).slot_mut(slot);
                let (Some(id), Some(target)) = (reference.attr("r:id"), target) else {
                    log::debug!("skipping {} without a usable type or id", reference.name);
                    continue;
                };
                *target = Some(HeaderFooterRef::Linked(id.to_string()));
            }
        }

        if let Some(size) = element.child("w:pgSz") {
            props.page_width = size.attr_parsed::<i64>("w:w").map(Length::twip);
            props.page_height = size.attr_parsed::<i64>("w:h").map(Length::twip);
            props.orientation = size.attr("w:orient").and_then(|o| o.parse().ok());
        }
        if let Some(margins) = element.child("w:pgMar") {
            let read = |name: &str| {
                margins
                    .attr_parsed::<i64>(name)
                    .map(Length::twip)
                    .unwrap_or(Length::ZERO)
            };
            props.margins = Some(PageMargins {
                top: read("w:top"),
                right: read("w:right"),
                bottom: read("w:bottom"),
                left: read("w:left"),
                header: read("w:header"),
                footer: read("w:footer"),
                gutter: read("w:gutter"),
            });
        }

        props
    }

    /// Whether any header or footer is set
    pub fn has_headers_or_footers(&self) -> bool {
        !self.headers.is_empty() || !self.footers.is_empty()
    }
}
