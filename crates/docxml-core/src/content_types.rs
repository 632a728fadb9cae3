//! Package content types (`[Content_Types].xml`)
//!
//! Parts are typed either by a `Default` entry for their extension or by an
//! `Override` entry for their exact part name. Overrides win.

use std::collections::BTreeMap;

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::paths;
use crate::relationships::escape_xml;

/// Archive entry of the content types manifest
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Namespace of the content types manifest
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Content type strings
pub mod content_type {
    /// Relationship manifest
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    /// Generic XML
    pub const XML: &str = "application/xml";
    /// Core properties
    pub const OPC_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    /// Main document of a `.docx`
    pub const WML_DOCUMENT_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    /// Main document of a `.dotx`
    pub const WML_TEMPLATE_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
    /// Styles part
    pub const WML_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
    /// Settings part
    pub const WML_SETTINGS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
    /// Numbering part
    pub const WML_NUMBERING: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
    /// Comments part
    pub const WML_COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";
    /// Header part
    pub const WML_HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
    /// Footer part
    pub const WML_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
    /// Fallback for unknown binaries
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

use content_type as ct;

/// Content type registry of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl Default for ContentTypes {
    fn default() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());
        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }
}

impl ContentTypes {
    /// Registry with the `rels` and `xml` defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `[Content_Types].xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self {
            defaults: BTreeMap::new(),
            overrides: BTreeMap::new(),
        };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => {
                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => {
                                key = Some(attr.unescape_value()?.into_owned())
                            }
                            b"ContentType" => {
                                content_type = Some(attr.unescape_value()?.into_owned())
                            }
                            _ => {}
                        }
                    }
                    match (e.local_name().as_ref(), key, content_type) {
                        (b"Default", Some(ext), Some(value)) => {
                            types.defaults.insert(ext.to_ascii_lowercase(), value);
                        }
                        (b"Override", Some(name), Some(value)) => {
                            types
                                .overrides
                                .insert(name.trim_start_matches('/').to_string(), value);
                        }
                        (b"Types", _, _) => {}
                        (other, _, _) => debug!(
                            "skipping content type entry {}",
                            String::from_utf8_lossy(other)
                        ),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Content type of a part, by override and then by extension
    pub fn get(&self, location: &str) -> Option<&str> {
        self.overrides
            .get(location.trim_start_matches('/'))
            .or_else(|| {
                self.defaults
                    .get(&paths::extension(location).to_ascii_lowercase())
            })
            .map(String::as_str)
    }

    /// Register a part, as a default when its extension maps to the same
    /// well-known type, otherwise as an override
    pub fn add(&mut self, location: &str, content_type: &str) {
        let ext = paths::extension(location).to_ascii_lowercase();
        if is_default_content_type(&ext, content_type) {
            self.defaults.insert(ext, content_type.to_string());
        } else if self.defaults.get(&ext).map(String::as_str) != Some(content_type) {
            self.overrides
                .insert(location.trim_start_matches('/').to_string(), content_type.to_string());
        }
    }

    /// Default entries, by extension
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Override entries, by part name without leading slash
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Generate the XML for `[Content_Types].xml`
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(2048);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{CONTENT_TYPES_NS}">"#));
        xml.push('\n');

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"  <Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
            xml.push('\n');
        }
        for (name, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"  <Override PartName="/{}" ContentType="{}"/>"#,
                escape_xml(name),
                escape_xml(content_type)
            ));
            xml.push('\n');
        }

        xml.push_str("</Types>");
        xml
    }
}

/// Check if an extension/content-type pair is a standard default
fn is_default_content_type(ext: &str, content_type: &str) -> bool {
    matches!(
        (ext, content_type),
        ("rels", ct::OPC_RELATIONSHIPS)
            | ("xml", ct::XML)
            | ("png", "image/png")
            | ("jpg", "image/jpeg")
            | ("jpeg", "image/jpeg")
            | ("gif", "image/gif")
            | ("bmp", "image/bmp")
            | ("tif", "image/tiff")
            | ("tiff", "image/tiff")
            | ("emf", "image/x-emf")
            | ("wmf", "image/x-wmf")
            | ("svg", "image/svg+xml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        let mut types = ContentTypes::new();
        types.add("word/document.xml", ct::WML_DOCUMENT_MAIN);
        types.add("word/media/a.png", "image/png");
        types.add("word/media/b.bin", ct::OCTET_STREAM);

        assert_eq!(types.get("word/document.xml"), Some(ct::WML_DOCUMENT_MAIN));
        assert_eq!(types.get("/word/media/c.PNG"), Some("image/png"));
        assert_eq!(types.get("customXml/item1.xml"), Some(ct::XML));
        assert_eq!(types.overrides().count(), 2);

        let xml = types.to_xml();
        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(&format!(
            r#"<Override PartName="/word/document.xml" ContentType="{}"/>"#,
            ct::WML_DOCUMENT_MAIN
        )));
    }

    #[test]
    fn test_parse() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="JPEG" ContentType="image/jpeg"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;
        let types = ContentTypes::parse(xml).unwrap();
        assert_eq!(types.get("word/styles.xml"), Some(ct::WML_STYLES));
        assert_eq!(types.get("word/media/x.jpeg"), Some("image/jpeg"));
        assert_eq!(types.get("word/media/x.gif"), None);
        assert_eq!(ContentTypes::parse(types.to_xml().as_bytes()).unwrap(), types);
    }
}
