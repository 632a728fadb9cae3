//! Relationship graph between package parts
//!
//! Every part that references other parts owns a [`Relationships`] set,
//! serialized as `_rels/<part>.rels` next to it. Internal relationships
//! own the part instance they point at, so the whole package is a tree
//! rooted at the package-level set (`_rels/.rels`).
//!
//! # Example
//!
//! ```
//! use docxml_core::parts::StylesXml;
//! use docxml_core::relationships::Relationships;
//!
//! let mut rels = Relationships::new("word/document.xml");
//! let styles = rels.ensure(StylesXml::new).unwrap();
//! assert_eq!(styles.location(), "word/styles.xml");
//! assert_eq!(rels.len(), 1);
//! ```

use std::collections::HashMap;

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{DocxError, Result};
use crate::ids::IdAllocator;
use crate::media;
use crate::parts::{BinaryPart, Part, PartType};
use crate::paths;

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const OFFICE_DOCUMENT_RELS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/";
const STRICT_RELS: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships/";

macro_rules! relationship_types {
    ($( $(#[$meta:meta])* $variant:ident => $uri:expr ),+ $(,)?) => {
        /// Kind of a relationship, identified by its type URI
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum RelationshipType {
            $( $(#[$meta])* $variant, )+
        }

        impl RelationshipType {
            /// Every known type
            pub const ALL: &'static [RelationshipType] = &[$( RelationshipType::$variant, )+];

            /// Transitional type URI
            pub fn uri(self) -> &'static str {
                match self {
                    $( RelationshipType::$variant => $uri, )+
                }
            }
        }
    };
}

relationship_types! {
    /// Package root to main document
    OfficeDocument => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
    /// Package root to core properties
    CoreProperties => "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
    /// Package root to application properties
    ExtendedProperties => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
    /// Package root to custom properties
    CustomProperties => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/custom-properties",
    /// Package thumbnail image
    Thumbnail => "http://schemas.openxmlformats.org/package/2006/relationships/metadata/thumbnail",
    /// `word/styles.xml`
    Styles => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
    /// `word/settings.xml`
    Settings => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings",
    /// `word/numbering.xml`
    Numbering => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering",
    /// `word/comments.xml`
    Comments => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments",
    /// `word/header{N}.xml`
    Header => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header",
    /// `word/footer{N}.xml`
    Footer => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer",
    /// Embedded picture
    Image => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image",
    /// External link target
    Hyperlink => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink",
    /// Template a document was created from
    AttachedTemplate => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/attachedTemplate",
    /// Font table
    FontTable => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/fontTable",
    /// Theme
    Theme => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme",
    /// Web settings
    WebSettings => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/webSettings",
    /// Endnotes
    Endnotes => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes",
    /// Footnotes
    Footnotes => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes",
    /// Custom XML data item
    CustomXml => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/customXml",
    /// Properties of a custom XML data item
    CustomXmlProperties => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/customXmlProps",
    /// Glossary document (building blocks)
    GlossaryDocument => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/glossaryDocument",
    /// Chart
    Chart => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart",
    /// SmartArt data
    DiagramData => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/diagramData",
    /// SmartArt layout
    DiagramLayout => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/diagramLayout",
    /// SmartArt style
    DiagramStyle => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/diagramQuickStyle",
    /// SmartArt colors
    DiagramColors => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/diagramColors",
    /// SmartArt drawing cache
    DiagramDrawing => "http://schemas.microsoft.com/office/2007/relationships/diagramDrawing",
    /// Extended comment data
    CommentsExtended => "http://schemas.microsoft.com/office/2011/relationships/commentsExtended",
    /// Durable comment ids
    CommentsIds => "http://schemas.microsoft.com/office/2016/09/relationships/commentsIds",
    /// Comment extensibility data
    CommentsExtensible => "http://schemas.microsoft.com/office/2018/08/relationships/commentsExtensible",
    /// Comment authors
    People => "http://schemas.microsoft.com/office/2011/relationships/people",
    /// Legacy styles with effects
    StylesWithEffects => "http://schemas.microsoft.com/office/2007/relationships/stylesWithEffects",
    /// Embedded OLE object
    OleObject => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/oleObject",
    /// Embedded package
    Package => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/package",
    /// Embedded font
    Font => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/font",
    /// HD Photo image
    HdPhoto => "http://schemas.microsoft.com/office/2007/relationships/hdphoto",
    /// Video
    Video => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/video",
    /// Audio
    Audio => "http://schemas.openxmlformats.org/officeDocument/2006/relationships/audio",
}

impl RelationshipType {
    /// Look up a type URI; strict-conformance URIs map onto their
    /// transitional counterparts
    pub fn from_uri(uri: &str) -> Result<Self> {
        let normalized = match uri.strip_prefix(STRICT_RELS) {
            Some(rest) => format!("{OFFICE_DOCUMENT_RELS}{rest}"),
            None => uri.to_string(),
        };
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.uri() == normalized)
            .ok_or_else(|| DocxError::UnknownRelationshipType(uri.to_string()))
    }

    /// Whether the target is stored as raw bytes rather than XML
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Image
                | Self::Thumbnail
                | Self::OleObject
                | Self::Package
                | Self::Font
                | Self::HdPhoto
                | Self::Video
                | Self::Audio
        )
    }
}

/// One entry of a relationship manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipMeta {
    /// Identifier, unique within the owning set
    pub id: String,
    /// Relationship kind
    pub rel_type: RelationshipType,
    /// Absolute part location, or the URI of an external target
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

impl RelationshipMeta {
    /// Whether the target is stored as raw bytes
    pub fn is_binary(&self) -> bool {
        !self.external && self.rel_type.is_binary()
    }
}

/// Relationships owned by one part
///
/// Keeps insertion order for deterministic serialization.
#[derive(Debug, Clone)]
pub struct Relationships {
    location: String,
    metas: Vec<RelationshipMeta>,
    instances: HashMap<String, Part>,
    ids: IdAllocator,
}

impl Relationships {
    /// Empty set owned by the part at `location` (`""` for the package
    /// root)
    pub fn new(location: &str) -> Self {
        Self::with_allocator(location, IdAllocator::new())
    }

    /// Empty set drawing identifiers from `ids`
    pub fn with_allocator(location: &str, ids: IdAllocator) -> Self {
        Self {
            location: location.to_string(),
            metas: Vec::new(),
            instances: HashMap::new(),
            ids,
        }
    }

    /// Location of the owning part
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Directory of the owning part, with trailing slash
    pub fn directory(&self) -> &str {
        paths::directory(&self.location)
    }

    /// Location of the manifest file for this set
    pub fn manifest_location(&self) -> String {
        paths::rels_location(&self.location)
    }

    /// Replace the identifier source, e.g. with a seeded one
    pub fn set_allocator(&mut self, ids: IdAllocator) {
        self.ids = ids;
    }

    /// Split off an allocator for a child set
    pub(crate) fn fork_allocator(&mut self) -> IdAllocator {
        self.ids.fork()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.metas.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    /// Entries in insertion order
    pub fn metas(&self) -> &[RelationshipMeta] {
        &self.metas
    }

    /// Entry with identifier `id`
    pub fn meta(&self, id: &str) -> Option<&RelationshipMeta> {
        self.metas.iter().find(|m| m.id == id)
    }

    /// First entry of a type
    pub fn find_by_type(&self, rel_type: RelationshipType) -> Option<&RelationshipMeta> {
        self.metas.iter().find(|m| m.rel_type == rel_type)
    }

    /// Part behind relationship `id`
    pub fn part(&self, id: &str) -> Option<&Part> {
        self.instances.get(id)
    }

    /// Mutable part behind relationship `id`
    pub fn part_mut(&mut self, id: &str) -> Option<&mut Part> {
        self.instances.get_mut(id)
    }

    /// Bytes of a binary part
    pub fn binary_data(&self, id: &str) -> Option<&[u8]> {
        match self.instances.get(id)? {
            Part::Binary(binary) => Some(&binary.data),
            _ => None,
        }
    }

    fn allocate_id(&mut self) -> String {
        let metas = &self.metas;
        self.ids.next_unique(|candidate| metas.iter().any(|m| m.id == candidate))
    }

    /// Add an internal relationship that has no part instance attached
    ///
    /// `target` is resolved against the owning part's directory.
    pub fn add(&mut self, rel_type: RelationshipType, target: &str) -> String {
        let id = self.allocate_id();
        let target = paths::resolve(self.directory(), target);
        debug!("{}: added {:?} relationship {id} -> {target}", self.location, rel_type);
        self.metas.push(RelationshipMeta {
            id: id.clone(),
            rel_type,
            target,
            external: false,
        });
        id
    }

    /// Add an external relationship, reusing an equal one
    pub fn add_external(&mut self, rel_type: RelationshipType, uri: &str) -> String {
        if let Some(existing) = self
            .metas
            .iter()
            .find(|m| m.external && m.rel_type == rel_type && m.target == uri)
        {
            return existing.id.clone();
        }
        let id = self.allocate_id();
        debug!("{}: added external {:?} relationship {id} -> {uri}", self.location, rel_type);
        self.metas.push(RelationshipMeta {
            id: id.clone(),
            rel_type,
            target: uri.to_string(),
            external: true,
        });
        id
    }

    /// Adopt a part and return the id of the new relationship to it
    pub fn add_part(&mut self, rel_type: RelationshipType, mut part: Part) -> String {
        let id = self.allocate_id();
        if let Some(child) = part.relationships_mut() {
            child.set_allocator(self.ids.fork());
        }
        debug!(
            "{}: added {:?} relationship {id} -> {}",
            self.location,
            rel_type,
            part.location()
        );
        self.metas.push(RelationshipMeta {
            id: id.clone(),
            rel_type,
            target: part.location().to_string(),
            external: false,
        });
        self.instances.insert(id.clone(), part);
        id
    }

    /// Store an image under `media_directory` (relative to the owning
    /// part) and return its relationship id
    ///
    /// Files are named by content hash, so the same bytes added twice share
    /// one part and one relationship.
    pub fn add_media(&mut self, data: &[u8], media_directory: &str) -> String {
        let target = paths::resolve(
            self.directory(),
            &format!("{}/{}", media_directory, media::media_file_name(data)),
        );
        if let Some(existing) = self
            .metas
            .iter()
            .find(|m| m.rel_type == RelationshipType::Image && m.target == target)
        {
            return existing.id.clone();
        }
        let content_type = media::content_type_for_extension(paths::extension(&target));
        let part = BinaryPart::new(&target, content_type, data.to_vec());
        self.add_part(RelationshipType::Image, Part::Binary(part))
    }

    /// First `{directory}{stem}{N}.{extension}` not yet targeted by this set
    pub fn free_location(&self, stem: &str, extension: &str) -> String {
        let directory = self.directory();
        (1..)
            .map(|n| format!("{directory}{stem}{n}.{extension}"))
            .find(|candidate| !self.metas.iter().any(|m| !m.external && &m.target == candidate))
            .unwrap_or_default()
    }

    /// The part of type `T`, created with `factory` on first use
    ///
    /// `factory` receives the default location of the part and is not
    /// called when the relationship already exists.
    pub fn ensure<T: PartType>(&mut self, factory: impl FnOnce(&str) -> T) -> Result<&mut T> {
        let id = match self.find_by_type(T::RELATIONSHIP) {
            Some(meta) => meta.id.clone(),
            None => {
                let location = paths::resolve(self.directory(), T::DEFAULT_NAME);
                debug!("{}: creating {:?} part at {location}", self.location, T::RELATIONSHIP);
                let part = factory(&location).into_part();
                self.add_part(T::RELATIONSHIP, part)
            }
        };
        self.instances
            .get_mut(&id)
            .and_then(T::from_part_mut)
            .ok_or_else(|| {
                DocxError::InvalidStructure(format!(
                    "{:?} relationship {id} does not point at a matching part",
                    T::RELATIONSHIP
                ))
            })
    }

    /// The part of type `T`, if a relationship to one exists
    pub fn get<T: PartType>(&self) -> Option<&T> {
        let meta = self.find_by_type(T::RELATIONSHIP)?;
        self.instances.get(&meta.id).and_then(T::from_part)
    }

    /// Mutable part of type `T`, if a relationship to one exists
    pub fn get_mut<T: PartType>(&mut self) -> Option<&mut T> {
        let id = self.find_by_type(T::RELATIONSHIP)?.id.clone();
        self.instances.get_mut(&id).and_then(T::from_part_mut)
    }

    /// First part whose relationship satisfies `predicate`
    pub fn find_instance(&self, predicate: impl Fn(&RelationshipMeta) -> bool) -> Option<&Part> {
        self.metas
            .iter()
            .filter(|m| predicate(m))
            .find_map(|m| self.instances.get(&m.id))
    }

    /// Every part whose relationship satisfies `predicate`, in order
    pub fn filter_instances<'a>(
        &'a self,
        predicate: impl Fn(&RelationshipMeta) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Part> + 'a {
        self.metas
            .iter()
            .filter(move |m| predicate(m))
            .filter_map(|m| self.instances.get(&m.id))
    }

    /// Remove a relationship and return its part, if it had one
    pub fn remove(&mut self, id: &str) -> Option<Part> {
        self.metas.retain(|m| m.id != id);
        self.instances.remove(id)
    }

    /// Attach a parsed entry and its hydrated part
    pub(crate) fn insert_loaded(&mut self, meta: RelationshipMeta, part: Option<Part>) {
        if let Some(part) = part {
            self.instances.insert(meta.id.clone(), part);
        }
        self.metas.push(meta);
    }

    fn is_pruned(&self, meta: &RelationshipMeta, prune: bool) -> bool {
        prune
            && self
                .instances
                .get(&meta.id)
                .is_some_and(|part| part.is_empty())
    }

    /// Owned parts, depth first, each followed by its own related parts
    ///
    /// With `prune`, empty parts and everything below them are left out.
    pub fn related(&self, prune: bool) -> Vec<&Part> {
        let mut parts = Vec::new();
        self.collect_related(prune, &mut parts);
        parts
    }

    fn collect_related<'a>(&'a self, prune: bool, parts: &mut Vec<&'a Part>) {
        for meta in &self.metas {
            let Some(part) = self.instances.get(&meta.id) else {
                continue;
            };
            if self.is_pruned(meta, prune) {
                debug!("{}: pruning empty part {}", self.location, part.location());
                continue;
            }
            parts.push(part);
            if let Some(child) = part.relationships() {
                child.collect_related(prune, parts);
            }
        }
    }

    /// Run the relationship pre-walk over every owned part
    pub(crate) fn link_parts(&mut self, media_directory: &str) -> Result<()> {
        let ids: Vec<String> = self.metas.iter().map(|m| m.id.clone()).collect();
        for id in ids {
            if let Some(part) = self.instances.get_mut(&id) {
                part.ensure_relationships(media_directory)?;
            }
        }
        Ok(())
    }

    /// Serialize to OOXML format
    ///
    /// Internal targets are written relative to the owning part's
    /// directory. With `prune`, relationships to empty parts are left out.
    pub fn to_xml(&self, prune: bool) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));
        xml.push('\n');

        for meta in &self.metas {
            if self.is_pruned(meta, prune) {
                continue;
            }
            let target = if meta.external {
                meta.target.clone()
            } else {
                paths::relative(self.directory(), &meta.target)
            };
            xml.push_str("  <Relationship");
            xml.push_str(&format!(r#" Id="{}""#, escape_xml(&meta.id)));
            xml.push_str(&format!(r#" Type="{}""#, escape_xml(meta.rel_type.uri())));
            xml.push_str(&format!(r#" Target="{}""#, escape_xml(&target)));
            if meta.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>\n");
        }

        xml.push_str("</Relationships>");
        xml
    }

    /// Parse the entries of a manifest owned by the part at `location`
    ///
    /// Internal targets come back as absolute part locations.
    pub fn parse_metas(location: &str, xml: &[u8]) -> Result<Vec<RelationshipMeta>> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let directory = paths::directory(location);
        let mut metas = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut external = false;

                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = attr.unescape_value()?.into_owned();
                            match attr.key.as_ref() {
                                b"Id" => id = Some(value),
                                b"Target" => target = Some(value),
                                b"Type" => rel_type = Some(value),
                                b"TargetMode" => external = value == "External",
                                _ => {}
                            }
                        }

                        match (id, target, rel_type) {
                            (Some(id), Some(target), Some(rel_type)) => {
                                let rel_type = RelationshipType::from_uri(&rel_type)?;
                                let target = if external {
                                    target
                                } else {
                                    paths::resolve(directory, &target)
                                };
                                metas.push(RelationshipMeta {
                                    id,
                                    rel_type,
                                    target,
                                    external,
                                });
                            }
                            _ => debug!("{location}: skipping incomplete relationship entry"),
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(metas)
    }
}

/// Escape special XML characters in attribute values
pub(crate) fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::{SettingsXml, StylesXml};
    use crate::styles::{Style, StyleType};
    use crate::test_utils::tiny_png;

    #[test]
    fn test_parse_relationships() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/customXml" Target="../customXml/item1.xml"/>
</Relationships>"#;

        let metas = Relationships::parse_metas("word/document.xml", xml).unwrap();
        assert_eq!(metas.len(), 3);
        assert_eq!(metas[0].rel_type, RelationshipType::Styles);
        assert_eq!(metas[0].target, "word/styles.xml");
        assert!(metas[1].external);
        assert_eq!(metas[1].target, "https://example.com/?a=1&b=2");
        assert_eq!(metas[2].target, "customXml/item1.xml");
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="urn:example:mystery" Target="mystery.xml"/>
</Relationships>"#;
        let err = Relationships::parse_metas("word/document.xml", xml).unwrap_err();
        assert!(matches!(err, DocxError::UnknownRelationshipType(uri) if uri == "urn:example:mystery"));
    }

    #[test]
    fn test_strict_uri_maps_to_transitional() {
        let uri = "http://purl.oclc.org/ooxml/officeDocument/relationships/styles";
        assert_eq!(RelationshipType::from_uri(uri).unwrap(), RelationshipType::Styles);
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut rels = Relationships::new("word/document.xml");
        let mut calls = 0;
        rels.ensure(|location| {
            calls += 1;
            StylesXml::new(location)
        })
        .unwrap()
        .add(Style::new("Quote", StyleType::Paragraph))
        .unwrap();

        let styles = rels
            .ensure(|location| {
                calls += 1;
                StylesXml::new(location)
            })
            .unwrap();
        assert!(styles.has("Quote"));
        assert_eq!(calls, 1);
        assert_eq!(rels.len(), 1);
    }

    #[test]
    fn test_get_without_relationship_is_none() {
        let rels = Relationships::new("word/document.xml");
        assert!(rels.get::<SettingsXml>().is_none());
        assert!(rels.find_by_type(RelationshipType::Settings).is_none());
    }

    #[test]
    fn test_external_relationships_are_reused() {
        let mut rels = Relationships::new("word/document.xml");
        let a = rels.add_external(RelationshipType::Hyperlink, "https://example.com");
        let b = rels.add_external(RelationshipType::Hyperlink, "https://example.com");
        let c = rels.add_external(RelationshipType::Hyperlink, "https://example.org");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_media_is_deduplicated() {
        let mut rels = Relationships::new("word/document.xml");
        let png = tiny_png();
        let a = rels.add_media(&png, "media");
        let b = rels.add_media(&png, "media");
        assert_eq!(a, b);

        let meta = rels.meta(&a).unwrap();
        assert!(meta.target.starts_with("word/media/"));
        assert!(meta.target.ends_with(".png"));
        assert!(meta.is_binary());
        assert_eq!(rels.binary_data(&a), Some(png.as_slice()));
    }

    #[test]
    fn test_free_location() {
        let mut rels = Relationships::new("word/document.xml");
        assert_eq!(rels.free_location("header", "xml"), "word/header1.xml");
        rels.add(RelationshipType::Header, "header1.xml");
        assert_eq!(rels.free_location("header", "xml"), "word/header2.xml");
    }

    #[test]
    fn test_to_xml_relative_and_external() {
        let mut rels = Relationships::with_allocator("word/document.xml", IdAllocator::seeded(1));
        let internal = rels.add(RelationshipType::CustomXml, "../customXml/item1.xml");
        let external = rels.add_external(RelationshipType::Hyperlink, "https://example.com/?a&b");
        let xml = rels.to_xml(false);

        assert!(xml.contains(&format!(r#"Id="{internal}""#)));
        assert!(xml.contains(r#"Target="../customXml/item1.xml""#));
        assert!(xml.contains(&format!(
            r#"Id="{external}" Type="{}" Target="https://example.com/?a&amp;b" TargetMode="External""#,
            RelationshipType::Hyperlink.uri()
        )));

        let metas = Relationships::parse_metas("word/document.xml", xml.as_bytes()).unwrap();
        assert_eq!(metas, rels.metas());
    }

    #[test]
    fn test_empty_parts_are_pruned() {
        let mut rels = Relationships::new("word/document.xml");
        rels.ensure(StylesXml::new).unwrap();
        rels.ensure(SettingsXml::new).unwrap().track_revisions = Some(true);

        let related: Vec<&str> = rels.related(true).iter().map(|p| p.location()).collect();
        assert_eq!(related, vec!["word/settings.xml"]);
        assert_eq!(rels.related(false).len(), 2);
        assert!(!rels.to_xml(true).contains("styles.xml"));
    }

    #[test]
    fn test_remove() {
        let mut rels = Relationships::new("word/document.xml");
        let id = rels.add_media(&tiny_png(), "media");
        assert!(matches!(rels.remove(&id), Some(Part::Binary(_))));
        assert!(rels.is_empty());
        assert!(rels.meta(&id).is_none());
    }
}
