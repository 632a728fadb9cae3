//! Owned XML element tree
//!
//! Components render to and parse from [`XmlElement`] rather than raw
//! strings. Names are kept in qualified form (`w:p`, `r:id`) using the
//! canonical OOXML prefixes, whatever prefixes the source document bound
//! to those namespaces.

use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::Writer;

use crate::error::Result;

/// WordprocessingML main namespace
pub const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships namespace (`r:id` attributes)
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// The predefined `xml:` namespace
pub const NS_XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Canonical prefixes, declared on the root of every rendered part
pub const NAMESPACES: &[(&str, &str)] = &[
    ("w", NS_W),
    ("r", NS_R),
    (
        "wp",
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing",
    ),
    ("a", "http://schemas.openxmlformats.org/drawingml/2006/main"),
    ("pic", "http://schemas.openxmlformats.org/drawingml/2006/picture"),
    ("m", "http://schemas.openxmlformats.org/officeDocument/2006/math"),
    ("mc", "http://schemas.openxmlformats.org/markup-compatibility/2006"),
    ("v", "urn:schemas-microsoft-com:vml"),
    ("o", "urn:schemas-microsoft-com:office:office"),
    ("w14", "http://schemas.microsoft.com/office/word/2010/wordml"),
    (
        "wps",
        "http://schemas.microsoft.com/office/word/2010/wordprocessingShape",
    ),
];

/// Elements whose whitespace-only text is significant
const TEXT_ELEMENTS: &[&str] = &["t", "delText", "instrText", "delInstrText"];

/// A node in the tree: an element or a run of character data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Element node
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        XmlNode::Element(element)
    }
}

/// An element with its attributes and children, in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Qualified name, e.g. `w:p`
    pub name: String,
    /// Attributes as (qualified name, unescaped value)
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element with no attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: add an attribute when the value is present
    pub fn with_opt_attr<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_attr(name, value),
            None => self,
        }
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: append a child when present
    pub fn with_opt_child(mut self, child: Option<XmlElement>) -> Self {
        if let Some(child) = child {
            self.children.push(XmlNode::Element(child));
        }
        self
    }

    /// Builder: append several children
    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Builder: append character data
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Append a child
    pub fn push(&mut self, child: impl Into<XmlNode>) {
        self.children.push(child.into());
    }

    /// Set (or replace) an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Get an attribute value by qualified name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get an attribute and parse it, ignoring values that do not parse
    pub fn attr_parsed<T: FromStr>(&self, name: &str) -> Option<T> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    /// Local part of the element name
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    /// Whether this element has the given qualified name
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// First descendant (depth-first, excluding self) with the given name
    pub fn descendant(&self, name: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated character data of the direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// True when the element carries neither attributes nor children
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &[u8]) -> Result<XmlElement> {
        let mut reader = NsReader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let element = open_element(&reader, e)?;
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let element = open_element(&reader, e)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(ref t) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = t.unescape()?;
                        push_text(parent, &text);
                    }
                }
                Event::CData(c) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8(c.into_inner().into_owned())?;
                        push_text(parent, &text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        // Unclosed elements still yield a best-effort tree
        while let Some(element) = stack.pop() {
            attach(&mut stack, &mut root, element);
        }

        root.ok_or_else(|| {
            crate::error::DocxError::InvalidStructure("XML document has no root element".into())
        })
    }

    /// Serialize as a standalone part: XML declaration plus namespace
    /// declarations for every canonical prefix on the root element
    pub fn to_xml_document(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer.get_mut().push(b'\n');

        let declarations: Vec<(String, &str)> = NAMESPACES
            .iter()
            .map(|(prefix, uri)| (format!("xmlns:{prefix}"), *uri))
            .collect();
        write_element(&mut writer, self, declarations.as_slice())?;
        Ok(writer.into_inner())
    }

    /// Serialize this element alone, without declarations
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        write_element::<_, &str>(&mut writer, self, &[])?;
        Ok(String::from_utf8(writer.into_inner())?)
    }
}

fn open_element(reader: &NsReader<&[u8]>, e: &BytesStart) -> Result<XmlElement> {
    let (resolved, local) = reader.resolve_element(e.name());
    let mut element = XmlElement::new(qualify(resolved, local.as_ref(), e.name()));

    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let name = qualify(resolved, local.as_ref(), attr.key);
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((name, value));
    }

    Ok(element)
}

/// Map a resolved name onto its canonical prefix, falling back to the
/// name as written when the namespace is not one we know
fn qualify(resolved: ResolveResult, local: &[u8], raw: QName) -> String {
    let local = String::from_utf8_lossy(local);
    if let ResolveResult::Bound(ns) = resolved {
        let uri = ns.as_ref();
        if uri == NS_XML.as_bytes() {
            return format!("xml:{local}");
        }
        if let Some((prefix, _)) = NAMESPACES.iter().find(|(_, u)| u.as_bytes() == uri) {
            return format!("{prefix}:{local}");
        }
    }
    String::from_utf8_lossy(raw.as_ref()).into_owned()
}

fn push_text(parent: &mut XmlElement, text: &str) {
    if text.is_empty() {
        return;
    }
    if !text.trim().is_empty() || TEXT_ELEMENTS.contains(&parent.local_name()) {
        // Entity references may split character data; merge adjacent runs
        if let Some(XmlNode::Text(previous)) = parent.children.last_mut() {
            previous.push_str(text);
        } else {
            parent.children.push(XmlNode::Text(text.to_string()));
        }
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn write_element<W: std::io::Write, K: AsRef<str>>(
    writer: &mut Writer<W>,
    element: &XmlElement,
    extra_attributes: &[(K, &str)],
) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in extra_attributes {
        start.push_attribute((key.as_ref(), *value));
    }
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element::<W, &str>(writer, child, &[])?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
