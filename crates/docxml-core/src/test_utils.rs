//! Shared test utilities
//!
//! Fragment parsing, single-component rendering and fixture packages.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::PackageArchive;
use crate::bookmarks::Bookmarks;
use crate::component::{Ancestry, Component, ComponentType, ParseContext, RenderContext};
use crate::error::{DocxError, Result};
use crate::registry::ComponentRegistry;
use crate::relationships::Relationships;
use crate::xml::{XmlElement, XmlNode, NAMESPACES};

/// A 1x1 transparent PNG
pub fn tiny_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Parse a prefixed fragment such as `<w:p>...</w:p>` into an element,
/// declaring every canonical namespace around it
pub fn fragment_element(xml: &str) -> Result<XmlElement> {
    let declarations: String = NAMESPACES
        .iter()
        .map(|(prefix, uri)| format!(r#" xmlns:{prefix}="{uri}""#))
        .collect();
    let wrapped = format!("<fragment{declarations}>{xml}</fragment>");
    let root = XmlElement::parse(wrapped.as_bytes())?;
    let first = root
        .elements()
        .next()
        .cloned()
        .ok_or_else(|| DocxError::InvalidStructure("empty fragment".into()));
    first
}

/// Parse a fragment as component `T`, resolving relationships in `rels`
pub fn try_parse_fragment_in<T: ComponentType>(xml: &str, rels: &Relationships) -> Result<T> {
    let element = fragment_element(xml)?;
    let registry = ComponentRegistry::standard();
    let mut bookmarks = Bookmarks::new();
    let mut cx = ParseContext {
        registry: &registry,
        relationships: rels,
        bookmarks: &mut bookmarks,
    };
    T::from_node(&element, &mut cx)
}

/// Parse a fragment as component `T` in an empty document
pub fn try_parse_fragment<T: ComponentType>(xml: &str) -> Result<T> {
    try_parse_fragment_in(xml, &Relationships::new("word/document.xml"))
}

/// Like [`try_parse_fragment_in`], panicking on failure
pub fn parse_fragment_in<T: ComponentType>(xml: &str, rels: &Relationships) -> T {
    try_parse_fragment_in(xml, rels).unwrap()
}

/// Like [`try_parse_fragment`], panicking on failure
pub fn parse_fragment<T: ComponentType>(xml: &str) -> T {
    try_parse_fragment(xml).unwrap()
}

/// Run `f` with a parse context over an empty document
pub fn parse_with<T>(f: impl FnOnce(&mut ParseContext<'_>) -> Result<T>) -> T {
    let registry = ComponentRegistry::standard();
    let relationships = Relationships::new("word/document.xml");
    let mut bookmarks = Bookmarks::new();
    let mut cx = ParseContext {
        registry: &registry,
        relationships: &relationships,
        bookmarks: &mut bookmarks,
    };
    f(&mut cx).unwrap()
}

/// Render a component and return its first element
pub fn render_one(component: &dyn Component, ancestry: &Ancestry<'_>) -> XmlElement {
    let mut cx = RenderContext::new();
    component
        .to_nodes(&mut cx, ancestry)
        .unwrap()
        .into_iter()
        .find_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
        .expect("component rendered no element")
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const HELLO_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Hello</w:t></w:r></w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#;

/// Smallest readable package: one paragraph saying "Hello"
pub fn minimal_package() -> PackageArchive {
    let mut archive = PackageArchive::new();
    archive.set_string("[Content_Types].xml", CONTENT_TYPES);
    archive.set_string("_rels/.rels", ROOT_RELS);
    archive.set_string("word/document.xml", HELLO_DOCUMENT);
    archive
}

/// A `.dotx` with corporate styles, settings and numbering, as ZIP bytes
pub fn template_package() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let files: [(&str, &str); 7] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>
  <Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
</Types>"#,
        ),
        ("_rels/.rels", ROOT_RELS),
        (
            "word/_rels/document.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
</Relationships>"#,
        ),
        (
            "word/styles.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Normal" w:default="1">
    <w:name w:val="Normal"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/>
    <w:basedOn w:val="Heading1"/>
    <w:pPr><w:outlineLvl w:val="1"/></w:pPr>
  </w:style>
  <w:style w:type="table" w:styleId="TableGrid">
    <w:name w:val="Table Grid"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="ListBullet">
    <w:name w:val="List Bullet"/>
    <w:basedOn w:val="Normal"/>
  </w:style>
</w:styles>"#,
        ),
        (
            "word/settings.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:zoom w:percent="100"/>
  <w:trackRevisions/>
  <w:defaultTabStop w:val="708"/>
</w:settings>"#,
        ),
        (
            "word/numbering.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:multiLevelType w:val="singleLevel"/>
    <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="-"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
</w:numbering>"#,
        ),
        (
            "word/document.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Template title</w:t></w:r></w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#,
        ),
    ];

    for (name, contents) in files {
        zip.start_file(name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}
