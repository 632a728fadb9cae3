//! Package-level reading and writing
//!
//! A [`Docx`] owns the root relationship set of a package. Everything else
//! (the main document, its styles, settings, numbering, comments, headers,
//! footers, media and any passthrough parts) hangs off that set as a tree
//! of [`Part`]s.

use std::collections::{BTreeMap, HashMap};
use std::mem;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::archive::PackageArchive;
use crate::bookmarks::Bookmarks;
use crate::component::RenderContext;
use crate::config::PackageConfig;
use crate::content_types::{content_type, ContentTypes, CONTENT_TYPES_PATH};
use crate::error::{DocxError, Result};
use crate::ids::IdAllocator;
use crate::parts::{
    BinaryPart, CommentsXml, DocumentXml, HeaderFooterXml, NumberingXml, OpaquePart, Part,
    SettingsXml, StylesXml,
};
use crate::paths;
use crate::properties::HeaderFooterKind;
use crate::registry::ComponentRegistry;
use crate::relationships::{RelationshipMeta, RelationshipType, Relationships};
use crate::styles::StyleType;

/// Location of the main document in packages this crate creates
pub const DOCUMENT_PATH: &str = "word/document.xml";

/// A WordprocessingML package
#[derive(Debug)]
pub struct Docx {
    config: PackageConfig,
    registry: Arc<ComponentRegistry>,
    relationships: Relationships,
}

impl Default for Docx {
    fn default() -> Self {
        Self::new()
    }
}

impl Docx {
    /// Empty document with the default configuration
    pub fn new() -> Self {
        Self::with_config(PackageConfig::default())
    }

    /// Empty document
    pub fn with_config(config: PackageConfig) -> Self {
        let mut relationships = Relationships::with_allocator("", config.allocator());
        relationships.add_part(
            RelationshipType::OfficeDocument,
            Part::Document(DocumentXml::new(DOCUMENT_PATH)),
        );
        Self {
            config,
            registry: Arc::new(ComponentRegistry::standard()),
            relationships,
        }
    }

    /// Replace the component registry used when parsing
    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Writing configuration
    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Mutable writing configuration
    pub fn config_mut(&mut self) -> &mut PackageConfig {
        &mut self.config
    }

    /// Root relationships (`_rels/.rels`)
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// The main document part
    pub fn document(&self) -> Result<&DocumentXml> {
        self.relationships
            .get::<DocumentXml>()
            .ok_or(DocxError::MissingOfficeDocument)
    }

    /// The main document part, mutably
    pub fn document_mut(&mut self) -> Result<&mut DocumentXml> {
        self.relationships
            .get_mut::<DocumentXml>()
            .ok_or(DocxError::MissingOfficeDocument)
    }

    /// Every part that would be written, depth first from the root
    pub fn parts(&self) -> Vec<&Part> {
        self.relationships.related(self.config.prune_empty_parts)
    }

    /// Open a `.docx` or `.dotx` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, PackageConfig::default())
    }

    /// Open a file with an explicit configuration
    pub fn open_with<P: AsRef<Path>>(path: P, config: PackageConfig) -> Result<Self> {
        let archive = PackageArchive::open(path)?;
        Self::from_archive(&archive, config)
    }

    /// Read a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, PackageConfig::default())
    }

    /// Read a package held in memory with an explicit configuration
    pub fn from_bytes_with(bytes: &[u8], config: PackageConfig) -> Result<Self> {
        let archive = PackageArchive::from_bytes(bytes)?;
        Self::from_archive(&archive, config)
    }

    /// Rebuild the part tree of an unpacked archive
    pub fn from_archive(archive: &PackageArchive, config: PackageConfig) -> Result<Self> {
        Self::from_archive_with_registry(archive, config, ComponentRegistry::standard())
    }

    /// Rebuild the part tree, parsing components with `registry`
    pub fn from_archive_with_registry(
        archive: &PackageArchive,
        config: PackageConfig,
        registry: ComponentRegistry,
    ) -> Result<Self> {
        let content_types = ContentTypes::parse(archive.require(CONTENT_TYPES_PATH)?)?;
        let mut reader = PackageReader {
            archive,
            content_types,
            registry: &registry,
            bookmarks: Bookmarks::new(),
            loading: Vec::new(),
            ids: config.allocator(),
        };

        let mut relationships = reader.load_relationships("")?;
        let document = relationships
            .get_mut::<DocumentXml>()
            .ok_or(DocxError::MissingOfficeDocument)?;
        document.bookmarks = mem::take(&mut reader.bookmarks);

        info!(
            "read package: {} entries, {} parts",
            archive.len(),
            relationships.related(false).len()
        );
        Ok(Self {
            config,
            registry: Arc::new(registry),
            relationships,
        })
    }

    /// Serialize every reachable part into an archive
    ///
    /// Runs the relationship pre-walk first, so media, headers and footers
    /// get their identifiers before any XML refers to them. Styles that are
    /// referenced but never defined are added as placeholders.
    pub fn to_archive(&mut self) -> Result<PackageArchive> {
        let media_directory = self.config.media_directory.clone();
        let prune = self.config.prune_empty_parts;

        self.document()?;
        self.relationships.link_parts(&media_directory)?;

        let mut cx = match self.document()?.comments() {
            Some(comments) => RenderContext::with_comments(comments.ids()),
            None => RenderContext::new(),
        };

        // Content parts first: they record the styles they use
        let mut rendered: HashMap<String, Vec<u8>> = HashMap::new();
        for part in self.relationships.related(prune) {
            let is_content = matches!(
                part,
                Part::Document(_) | Part::HeaderFooter(_) | Part::Comments(_)
            );
            if is_content && !rendered.contains_key(part.location()) {
                rendered.insert(part.location().to_string(), part.render(&mut cx)?);
            }
        }

        self.add_placeholder_styles(cx.referenced_styles())?;

        let mut archive = PackageArchive::new();
        let mut content_types = ContentTypes::new();
        for part in self.relationships.related(prune) {
            let location = part.location();
            if archive.contains(location) {
                continue;
            }
            let data = match rendered.remove(location) {
                Some(data) => data,
                None => part.render(&mut cx)?,
            };
            archive.set(location, data);
            content_types.add(location, part.content_type());

            if let Some(relationships) = part.relationships().filter(|r| !r.is_empty()) {
                archive.set_string(relationships.manifest_location(), relationships.to_xml(prune));
            }
        }

        archive.set_string(
            self.relationships.manifest_location(),
            self.relationships.to_xml(prune),
        );
        archive.set_string(CONTENT_TYPES_PATH, content_types.to_xml());

        info!(
            "wrote package: {} entries, {} content type overrides",
            archive.len(),
            content_types.overrides().count()
        );
        Ok(archive)
    }

    fn add_placeholder_styles(&mut self, referenced: &BTreeMap<String, StyleType>) -> Result<()> {
        let document = self.document()?;
        let missing: Vec<(String, StyleType)> = referenced
            .iter()
            .filter(|(id, _)| !document.styles().is_some_and(|styles| styles.has(id)))
            .map(|(id, kind)| (id.clone(), *kind))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let styles = self.document_mut()?.styles_mut()?;
        for (id, kind) in missing {
            styles.ensure_placeholder(&id, kind);
        }
        Ok(())
    }

    /// Serialize into `.docx` bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.to_archive()?.to_bytes(self.config.compression)
    }

    /// Write to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let compression = self.config.compression;
        self.to_archive()?.write_to_file(path, compression)
    }

    /// Independent copy, made by writing the package and reading it back
    pub fn try_clone(&mut self) -> Result<Self> {
        let archive = self.to_archive()?;
        let registry = Arc::clone(&self.registry);
        let mut copy = Self::from_archive(&archive, self.config.clone())?;
        copy.registry = registry;
        Ok(copy)
    }

    /// Open a file without blocking the runtime on the read
    #[cfg(feature = "async")]
    pub async fn open_async<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(&bytes)
    }

    /// Write to a file without blocking the runtime on the write
    #[cfg(feature = "async")]
    pub async fn save_async<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

/// Hydrates the part tree of an archive, one relationship set at a time
struct PackageReader<'a> {
    archive: &'a PackageArchive,
    content_types: ContentTypes,
    registry: &'a ComponentRegistry,
    bookmarks: Bookmarks,
    /// Parts currently being loaded, to stop on cyclic references
    loading: Vec<String>,
    ids: IdAllocator,
}

impl PackageReader<'_> {
    fn load_relationships(&mut self, owner: &str) -> Result<Relationships> {
        let archive = self.archive;
        let mut relationships = Relationships::with_allocator(owner, self.ids.fork());
        let manifest = paths::rels_location(owner);
        let Some(xml) = archive.get(&manifest) else {
            if owner.is_empty() {
                return Err(DocxError::MissingFile {
                    path: manifest,
                    available: archive.file_list(),
                });
            }
            return Ok(relationships);
        };

        for meta in Relationships::parse_metas(owner, xml)? {
            if meta.external {
                relationships.insert_loaded(meta, None);
            } else if !archive.contains(&meta.target) {
                if meta.rel_type == RelationshipType::OfficeDocument {
                    archive.require(&meta.target)?;
                }
                warn!("{owner}: relationship {} points at missing {}", meta.id, meta.target);
                relationships.insert_loaded(meta, None);
            } else if self.loading.contains(&meta.target) {
                debug!("{owner}: {} refers back to {}", meta.id, meta.target);
                relationships.insert_loaded(meta, None);
            } else {
                let part = self.load_part(&meta)?;
                relationships.insert_loaded(meta, Some(part));
            }
        }
        Ok(relationships)
    }

    fn load_part(&mut self, meta: &RelationshipMeta) -> Result<Part> {
        let archive = self.archive;
        let location = meta.target.as_str();
        let data = archive.require(location)?;
        let content_type = self
            .content_types
            .get(location)
            .map(str::to_string)
            .unwrap_or_else(|| {
                let fallback = if meta.rel_type.is_binary() {
                    content_type::OCTET_STREAM
                } else {
                    content_type::XML
                };
                debug!("{location} has no content type, using {fallback}");
                fallback.to_string()
            });

        if meta.rel_type.is_binary() {
            return Ok(Part::Binary(BinaryPart::new(location, content_type, data.to_vec())));
        }

        self.loading.push(location.to_string());
        let relationships = self.load_relationships(location)?;
        self.loading.pop();

        let registry = self.registry;
        let part = match meta.rel_type {
            RelationshipType::OfficeDocument => Part::Document(DocumentXml::parse(
                location,
                &content_type,
                data,
                relationships,
                registry,
                &mut self.bookmarks,
            )?),
            RelationshipType::Styles => {
                warn_dropped(&relationships);
                Part::Styles(StylesXml::parse(location, data)?)
            }
            RelationshipType::Numbering => {
                warn_dropped(&relationships);
                Part::Numbering(NumberingXml::parse(location, data)?)
            }
            RelationshipType::Settings => {
                Part::Settings(SettingsXml::parse(location, data, relationships)?)
            }
            RelationshipType::Comments => Part::Comments(CommentsXml::parse(
                location,
                data,
                relationships,
                registry,
                &mut self.bookmarks,
            )?),
            RelationshipType::Header | RelationshipType::Footer => {
                let kind = if meta.rel_type == RelationshipType::Header {
                    HeaderFooterKind::Header
                } else {
                    HeaderFooterKind::Footer
                };
                Part::HeaderFooter(HeaderFooterXml::parse(
                    kind,
                    location,
                    data,
                    relationships,
                    registry,
                    &mut self.bookmarks,
                )?)
            }
            _ => Part::Opaque(OpaquePart::new(
                location,
                content_type,
                data.to_vec(),
                relationships,
            )),
        };
        Ok(part)
    }
}

fn warn_dropped(relationships: &Relationships) {
    if !relationships.is_empty() {
        warn!(
            "dropping {} relationships of {}",
            relationships.len(),
            relationships.location()
        );
    }
}
