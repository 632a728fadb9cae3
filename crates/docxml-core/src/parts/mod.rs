//! Package parts
//!
//! A [`Part`] is one file of the package together with the relationships
//! it owns. Parts with a structured model (document, styles, settings,
//! numbering, comments, headers and footers) are parsed; every other known
//! relationship target is kept verbatim as an [`OpaquePart`] or
//! [`BinaryPart`].

mod binary;
mod comments;
mod document;
mod header_footer;
mod numbering;
mod opaque;
mod settings;
mod styles;

pub use binary::BinaryPart;
pub use comments::{CommentEntry, CommentsXml};
pub use document::DocumentXml;
pub use header_footer::HeaderFooterXml;
pub use numbering::{AbstractNumbering, NumberingInstance, NumberingLevel, NumberingXml};
pub use opaque::OpaquePart;
pub use settings::SettingsXml;
pub use styles::StylesXml;

use crate::component::RenderContext;
use crate::error::Result;
use crate::relationships::{RelationshipType, Relationships};

/// One file of the package
#[derive(Debug, Clone)]
pub enum Part {
    /// `word/document.xml`
    Document(DocumentXml),
    /// `word/styles.xml`
    Styles(StylesXml),
    /// `word/settings.xml`
    Settings(SettingsXml),
    /// `word/numbering.xml`
    Numbering(NumberingXml),
    /// `word/comments.xml`
    Comments(CommentsXml),
    /// `word/header{N}.xml` or `word/footer{N}.xml`
    HeaderFooter(HeaderFooterXml),
    /// Media and other raw bytes
    Binary(BinaryPart),
    /// XML part without a model, kept verbatim
    Opaque(OpaquePart),
}

impl Part {
    /// Short label for listings
    pub fn kind(&self) -> &'static str {
        match self {
            Part::Document(_) => "document",
            Part::Styles(_) => "styles",
            Part::Settings(_) => "settings",
            Part::Numbering(_) => "numbering",
            Part::Comments(_) => "comments",
            Part::HeaderFooter(part) => part.kind().stem(),
            Part::Binary(_) => "binary",
            Part::Opaque(_) => "opaque",
        }
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        match self {
            Part::Document(part) => part.location(),
            Part::Styles(part) => part.location(),
            Part::Settings(part) => part.location(),
            Part::Numbering(part) => part.location(),
            Part::Comments(part) => part.location(),
            Part::HeaderFooter(part) => part.location(),
            Part::Binary(part) => part.location(),
            Part::Opaque(part) => part.location(),
        }
    }

    /// Content type for `[Content_Types].xml`
    pub fn content_type(&self) -> &str {
        match self {
            Part::Document(part) => part.content_type(),
            Part::Styles(_) => StylesXml::CONTENT_TYPE,
            Part::Settings(_) => SettingsXml::CONTENT_TYPE,
            Part::Numbering(_) => NumberingXml::CONTENT_TYPE,
            Part::Comments(_) => CommentsXml::CONTENT_TYPE,
            Part::HeaderFooter(part) => part.content_type(),
            Part::Binary(part) => &part.content_type,
            Part::Opaque(part) => &part.content_type,
        }
    }

    /// Relationships owned by the part, if it can own any
    pub fn relationships(&self) -> Option<&Relationships> {
        match self {
            Part::Document(part) => Some(&part.relationships),
            Part::Settings(part) => Some(&part.relationships),
            Part::Comments(part) => Some(&part.relationships),
            Part::HeaderFooter(part) => Some(&part.relationships),
            Part::Opaque(part) => Some(&part.relationships),
            Part::Styles(_) | Part::Numbering(_) | Part::Binary(_) => None,
        }
    }

    /// Mutable relationships owned by the part
    pub fn relationships_mut(&mut self) -> Option<&mut Relationships> {
        match self {
            Part::Document(part) => Some(&mut part.relationships),
            Part::Settings(part) => Some(&mut part.relationships),
            Part::Comments(part) => Some(&mut part.relationships),
            Part::HeaderFooter(part) => Some(&mut part.relationships),
            Part::Opaque(part) => Some(&mut part.relationships),
            Part::Styles(_) | Part::Numbering(_) | Part::Binary(_) => None,
        }
    }

    /// Whether the part has nothing worth writing
    pub fn is_empty(&self) -> bool {
        match self {
            Part::Styles(part) => part.is_empty(),
            Part::Settings(part) => part.is_empty(),
            Part::Numbering(part) => part.is_empty(),
            Part::Comments(part) => part.is_empty(),
            Part::Document(_) | Part::HeaderFooter(_) | Part::Binary(_) | Part::Opaque(_) => false,
        }
    }

    /// Register the relationships the part's content needs, then do the
    /// same for every part it owns
    pub fn ensure_relationships(&mut self, media_directory: &str) -> Result<()> {
        match self {
            Part::Document(part) => part.link(media_directory)?,
            Part::Settings(part) => part.link(),
            Part::Comments(part) => part.link(media_directory)?,
            Part::HeaderFooter(part) => part.link(media_directory)?,
            Part::Styles(_) | Part::Numbering(_) | Part::Binary(_) | Part::Opaque(_) => {}
        }
        if let Some(relationships) = self.relationships_mut() {
            relationships.link_parts(media_directory)?;
        }
        Ok(())
    }

    /// Bytes of the part as written to the archive
    pub fn render(&self, cx: &mut RenderContext) -> Result<Vec<u8>> {
        match self {
            Part::Document(part) => part.to_node(cx)?.to_xml_document(),
            Part::Styles(part) => part.to_node().to_xml_document(),
            Part::Settings(part) => part.to_node().to_xml_document(),
            Part::Numbering(part) => part.to_node().to_xml_document(),
            Part::Comments(part) => part.to_node(cx)?.to_xml_document(),
            Part::HeaderFooter(part) => part.to_node(cx)?.to_xml_document(),
            Part::Binary(part) => Ok(part.data.clone()),
            Part::Opaque(part) => Ok(part.data.clone()),
        }
    }
}

/// A part kind that can be created on demand through
/// [`Relationships::ensure`]
pub trait PartType: Sized {
    /// Relationship type that points at the part
    const RELATIONSHIP: RelationshipType;
    /// File name, relative to the owning part's directory
    const DEFAULT_NAME: &'static str;

    /// Borrow from the generic part
    fn from_part(part: &Part) -> Option<&Self>;
    /// Mutably borrow from the generic part
    fn from_part_mut(part: &mut Part) -> Option<&mut Self>;
    /// Wrap in the generic part
    fn into_part(self) -> Part;
}

macro_rules! part_type {
    ($ty:ident, $variant:ident, $rel:ident, $name:literal) => {
        impl PartType for $ty {
            const RELATIONSHIP: RelationshipType = RelationshipType::$rel;
            const DEFAULT_NAME: &'static str = $name;

            fn from_part(part: &Part) -> Option<&Self> {
                match part {
                    Part::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_part_mut(part: &mut Part) -> Option<&mut Self> {
                match part {
                    Part::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_part(self) -> Part {
                Part::$variant(self)
            }
        }
    };
}

part_type!(DocumentXml, Document, OfficeDocument, "word/document.xml");
part_type!(StylesXml, Styles, Styles, "styles.xml");
part_type!(SettingsXml, Settings, Settings, "settings.xml");
part_type!(NumberingXml, Numbering, Numbering, "numbering.xml");
part_type!(CommentsXml, Comments, Comments, "comments.xml");
