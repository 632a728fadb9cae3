//! The settings part

use crate::content_types::content_type;
use crate::error::Result;
use crate::length::Length;
use crate::properties::{read_toggle, toggle_element};
use crate::relationships::{RelationshipType, Relationships};
use crate::xml::XmlElement;

/// Leading `w:settings` children in schema order, up to the last modelled
/// one; anything not listed follows them
const ELEMENT_ORDER: &[&str] = &[
    "w:writeProtection",
    "w:view",
    "w:zoom",
    "w:removePersonalInformation",
    "w:removeDateAndTime",
    "w:doNotDisplayPageBoundaries",
    "w:displayBackgroundShape",
    "w:printPostScriptOverText",
    "w:printFractionalCharacterWidth",
    "w:printFormsData",
    "w:embedTrueTypeFonts",
    "w:embedSystemFonts",
    "w:saveSubsetFonts",
    "w:saveFormsData",
    "w:mirrorMargins",
    "w:alignBordersAndEdges",
    "w:bordersDoNotSurroundHeader",
    "w:bordersDoNotSurroundFooter",
    "w:gutterAtTop",
    "w:hideSpellingErrors",
    "w:hideGrammaticalErrors",
    "w:activeWritingStyle",
    "w:proofState",
    "w:formsDesign",
    "w:attachedTemplate",
    "w:linkStyles",
    "w:stylePaneFormatFilter",
    "w:stylePaneSortMethod",
    "w:documentType",
    "w:mailMerge",
    "w:revisionView",
    "w:trackRevisions",
    "w:doNotTrackMoves",
    "w:doNotTrackFormatting",
    "w:documentProtection",
    "w:autoFormatOverride",
    "w:styleLockTheme",
    "w:styleLockQFSet",
    "w:defaultTabStop",
    "w:autoHyphenation",
    "w:consecutiveHyphenLimit",
    "w:hyphenationZone",
    "w:doNotHyphenateCaps",
    "w:showEnvelope",
    "w:summaryLength",
    "w:clickAndTypeStyle",
    "w:defaultTableStyle",
    "w:evenAndOddHeaders",
];

const MODELLED: &[&str] = &[
    "w:attachedTemplate",
    "w:trackRevisions",
    "w:defaultTabStop",
    "w:autoHyphenation",
    "w:evenAndOddHeaders",
];

/// `word/settings.xml`
#[derive(Debug, Clone)]
pub struct SettingsXml {
    location: String,
    /// Owns the attached-template relationship
    pub relationships: Relationships,
    /// Record insertions and deletions as tracked changes
    pub track_revisions: Option<bool>,
    /// Separate headers and footers for even pages
    pub even_and_odd_headers: Option<bool>,
    /// Hyphenate automatically
    pub auto_hyphenation: Option<bool>,
    /// Distance between default tab stops
    pub default_tab_stop: Option<Length>,
    /// URI of the template the document is attached to
    pub attached_template: Option<String>,
    template_relationship: Option<String>,
    other: Vec<XmlElement>,
}

impl SettingsXml {
    /// Content type of the part
    pub const CONTENT_TYPE: &'static str = content_type::WML_SETTINGS;

    /// Settings part with nothing set
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            relationships: Relationships::new(location),
            track_revisions: None,
            even_and_odd_headers: None,
            auto_hyphenation: None,
            default_tab_stop: None,
            attached_template: None,
            template_relationship: None,
            other: Vec::new(),
        }
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.track_revisions.is_none()
            && self.even_and_odd_headers.is_none()
            && self.auto_hyphenation.is_none()
            && self.default_tab_stop.is_none()
            && self.attached_template.is_none()
            && self.other.is_empty()
    }

    /// Settings this model does not cover, kept in document order
    pub fn unmodelled(&self) -> &[XmlElement] {
        &self.other
    }

    /// Point the attached-template relationship at the current URI
    pub(crate) fn link(&mut self) {
        let current = self
            .template_relationship
            .as_deref()
            .and_then(|id| self.relationships.meta(id))
            .map(|meta| meta.target.clone());
        if current.as_deref() == self.attached_template.as_deref() {
            return;
        }
        if let Some(old) = self.template_relationship.take() {
            self.relationships.remove(&old);
        }
        self.template_relationship = self
            .attached_template
            .as_deref()
            .map(|uri| self.relationships.add_external(RelationshipType::AttachedTemplate, uri));
    }

    /// Render `w:settings`
    ///
    /// The attached template is only written once linked.
    pub fn to_node(&self) -> XmlElement {
        let mut children: Vec<XmlElement> = [
            self.template_relationship
                .as_ref()
                .filter(|_| self.attached_template.is_some())
                .map(|id| XmlElement::new("w:attachedTemplate").with_attr("r:id", id)),
            toggle_element("w:trackRevisions", self.track_revisions),
            self.default_tab_stop.map(|tab| {
                XmlElement::new("w:defaultTabStop").with_attr("w:val", tab.as_twip())
            }),
            toggle_element("w:autoHyphenation", self.auto_hyphenation),
            toggle_element("w:evenAndOddHeaders", self.even_and_odd_headers),
        ]
        .into_iter()
        .flatten()
        .chain(self.other.iter().cloned())
        .collect();

        children.sort_by_key(|element| {
            ELEMENT_ORDER
                .iter()
                .position(|name| *name == element.name)
                .unwrap_or(ELEMENT_ORDER.len())
        });
        XmlElement::new("w:settings").with_children(children.into_iter().map(Into::into))
    }

    /// Parse the part
    pub fn parse(location: &str, xml: &[u8], relationships: Relationships) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        let template_relationship = root
            .child("w:attachedTemplate")
            .and_then(|e| e.attr("r:id"))
            .map(str::to_string);
        let attached_template = template_relationship
            .as_deref()
            .and_then(|id| relationships.meta(id))
            .map(|meta| meta.target.clone());

        Ok(Self {
            location: location.to_string(),
            track_revisions: read_toggle(&root, "w:trackRevisions"),
            even_and_odd_headers: read_toggle(&root, "w:evenAndOddHeaders"),
            auto_hyphenation: read_toggle(&root, "w:autoHyphenation"),
            default_tab_stop: root
                .child("w:defaultTabStop")
                .and_then(|e| e.attr_parsed::<i64>("w:val"))
                .map(Length::twip),
            attached_template,
            template_relationship,
            other: root
                .elements()
                .filter(|e| !MODELLED.contains(&e.name.as_str()))
                .cloned()
                .collect(),
            relationships,
        })
    }
}
