//! The numbering part
//!
//! Abstract definitions describe how each list level looks; concrete
//! instances are what paragraphs point at (`w:numPr/w:numId`). The two use
//! separate id spaces.

use std::collections::BTreeMap;

use log::debug;

use crate::content_types::content_type;
use crate::error::{DocxError, Result};
use crate::ids::KeyAllocator;
use crate::properties::{
    read_enum, read_parsed, read_val, val_element, Alignment, ParagraphProperties, TextProperties,
};
use crate::xml::{XmlElement, XmlNode};

/// Formatting of one list level (`w:lvl`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberingLevel {
    /// Zero-based level
    pub level: u8,
    /// First number
    pub start: Option<u32>,
    /// Number format (`decimal`, `bullet`, `lowerRoman` ...)
    pub format: Option<String>,
    /// Label template, e.g. `%1.`
    pub text: Option<String>,
    /// Label alignment
    pub alignment: Option<Alignment>,
    /// Paragraph formatting of the level
    pub paragraph: ParagraphProperties,
    /// Formatting of the label
    pub run: TextProperties,
}

impl NumberingLevel {
    /// Level with a format and label template
    pub fn new(level: u8, format: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            start: Some(1),
            format: Some(format.into()),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    fn to_node(&self) -> XmlElement {
        XmlElement::new("w:lvl")
            .with_attr("w:ilvl", self.level)
            .with_opt_child(self.start.map(|s| val_element("w:start", s)))
            .with_opt_child(self.format.as_ref().map(|f| val_element("w:numFmt", f)))
            .with_opt_child(self.text.as_ref().map(|t| val_element("w:lvlText", t)))
            .with_opt_child(self.alignment.map(|a| val_element("w:lvlJc", a)))
            .with_opt_child(self.paragraph.to_node())
            .with_opt_child(self.run.to_node())
    }

    fn from_node(element: &XmlElement) -> Self {
        Self {
            level: element.attr_parsed("w:ilvl").unwrap_or(0),
            start: read_parsed(element, "w:start"),
            format: read_val(element, "w:numFmt").map(str::to_string),
            text: read_val(element, "w:lvlText").map(str::to_string),
            alignment: read_enum(element, "w:lvlJc"),
            paragraph: element
                .child("w:pPr")
                .map(ParagraphProperties::from_node)
                .unwrap_or_default(),
            run: element
                .child("w:rPr")
                .map(TextProperties::from_node)
                .unwrap_or_default(),
        }
    }
}

/// Reusable list definition (`w:abstractNum`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbstractNumbering {
    /// Abstract numbering id
    pub id: u32,
    /// `singleLevel`, `multilevel` or `hybridMultilevel`
    pub multi_level_type: Option<String>,
    /// Levels, usually 0 to 8
    pub levels: Vec<NumberingLevel>,
}

impl AbstractNumbering {
    fn to_node(&self) -> XmlElement {
        XmlElement::new("w:abstractNum")
            .with_attr("w:abstractNumId", self.id)
            .with_opt_child(
                self.multi_level_type
                    .as_ref()
                    .map(|t| val_element("w:multiLevelType", t)),
            )
            .with_children(self.levels.iter().map(|l| XmlNode::Element(l.to_node())))
    }

    fn from_node(element: &XmlElement) -> Option<Self> {
        Some(Self {
            id: element.attr_parsed("w:abstractNumId")?,
            multi_level_type: read_val(element, "w:multiLevelType").map(str::to_string),
            levels: element
                .children_named("w:lvl")
                .map(NumberingLevel::from_node)
                .collect(),
        })
    }
}

/// Paragraph-facing list (`w:num`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingInstance {
    /// Concrete numbering id, as used by `w:numPr/w:numId`
    pub id: u32,
    /// Definition this instance uses
    pub abstract_id: u32,
    /// Start value overrides, by level
    pub overrides: BTreeMap<u8, u32>,
}

impl NumberingInstance {
    fn to_node(&self) -> XmlElement {
        XmlElement::new("w:num")
            .with_attr("w:numId", self.id)
            .with_child(val_element("w:abstractNumId", self.abstract_id))
            .with_children(self.overrides.iter().map(|(level, start)| {
                XmlNode::Element(
                    XmlElement::new("w:lvlOverride")
                        .with_attr("w:ilvl", level)
                        .with_child(val_element("w:startOverride", start)),
                )
            }))
    }

    fn from_node(element: &XmlElement) -> Option<Self> {
        Some(Self {
            id: element.attr_parsed("w:numId")?,
            abstract_id: read_parsed(element, "w:abstractNumId")?,
            overrides: element
                .children_named("w:lvlOverride")
                .filter_map(|o| Some((o.attr_parsed("w:ilvl")?, read_parsed(o, "w:startOverride")?)))
                .collect(),
        })
    }
}

/// `word/numbering.xml`
#[derive(Debug, Clone)]
pub struct NumberingXml {
    location: String,
    abstracts: BTreeMap<u32, AbstractNumbering>,
    instances: BTreeMap<u32, NumberingInstance>,
    abstract_ids: KeyAllocator,
    instance_ids: KeyAllocator,
}

impl NumberingXml {
    /// Content type of the part
    pub const CONTENT_TYPE: &'static str = content_type::WML_NUMBERING;

    /// Empty numbering part at `location`
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            abstracts: BTreeMap::new(),
            instances: BTreeMap::new(),
            abstract_ids: KeyAllocator::default(),
            // numId 0 means "no numbering"
            instance_ids: KeyAllocator::starting_at(1),
        }
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether there is nothing to write
    pub fn is_empty(&self) -> bool {
        self.abstracts.is_empty() && self.instances.is_empty()
    }

    /// Add a definition and return its abstract id
    pub fn add_abstract(&mut self, levels: Vec<NumberingLevel>) -> u32 {
        let id = self.abstract_ids.next();
        let multi_level_type = if levels.len() > 1 {
            "multilevel"
        } else {
            "singleLevel"
        };
        self.abstracts.insert(
            id,
            AbstractNumbering {
                id,
                multi_level_type: Some(multi_level_type.to_string()),
                levels,
            },
        );
        id
    }

    /// Add a concrete instance of an existing definition
    pub fn add(&mut self, abstract_id: u32) -> Result<u32> {
        if !self.abstracts.contains_key(&abstract_id) {
            return Err(DocxError::UnknownAbstractNumbering(abstract_id));
        }
        let id = self.instance_ids.next();
        self.instances.insert(
            id,
            NumberingInstance {
                id,
                abstract_id,
                overrides: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    /// Add a definition and an instance of it; returns the concrete id
    pub fn add_list(&mut self, levels: Vec<NumberingLevel>) -> Result<u32> {
        let abstract_id = self.add_abstract(levels);
        self.add(abstract_id)
    }

    /// Copy the definition behind instance `num_id` and wrap the copy in a
    /// new instance, so it can be changed independently
    pub fn clone_and_wrap(&mut self, num_id: u32) -> Result<u32> {
        let abstract_id = self
            .instances
            .get(&num_id)
            .ok_or(DocxError::UnknownNumbering(num_id))?
            .abstract_id;
        let mut copy = self
            .abstracts
            .get(&abstract_id)
            .cloned()
            .ok_or(DocxError::UnknownAbstractNumbering(abstract_id))?;

        copy.id = self.abstract_ids.next();
        debug!("cloning abstract numbering {abstract_id} as {}", copy.id);
        let new_abstract = copy.id;
        self.abstracts.insert(new_abstract, copy);
        self.add(new_abstract)
    }

    /// Restart `level` of instance `num_id` at `start`
    pub fn set_start_override(&mut self, num_id: u32, level: u8, start: u32) -> Result<()> {
        let instance = self
            .instances
            .get_mut(&num_id)
            .ok_or(DocxError::UnknownNumbering(num_id))?;
        instance.overrides.insert(level, start);
        Ok(())
    }

    /// Definition by abstract id
    pub fn get_abstract(&self, abstract_id: u32) -> Option<&AbstractNumbering> {
        self.abstracts.get(&abstract_id)
    }

    /// Mutable definition by abstract id
    pub fn get_abstract_mut(&mut self, abstract_id: u32) -> Option<&mut AbstractNumbering> {
        self.abstracts.get_mut(&abstract_id)
    }

    /// Instance by concrete id
    pub fn get(&self, num_id: u32) -> Option<&NumberingInstance> {
        self.instances.get(&num_id)
    }

    /// Whether instance `num_id` exists
    pub fn has(&self, num_id: u32) -> bool {
        self.instances.contains_key(&num_id)
    }

    /// Definition used by instance `num_id`
    pub fn definition_of(&self, num_id: u32) -> Option<&AbstractNumbering> {
        self.abstracts.get(&self.instances.get(&num_id)?.abstract_id)
    }

    /// Instances in id order
    pub fn instances(&self) -> impl Iterator<Item = &NumberingInstance> {
        self.instances.values()
    }

    /// Render `w:numbering`; every definition precedes every instance
    pub fn to_node(&self) -> XmlElement {
        XmlElement::new("w:numbering")
            .with_children(self.abstracts.values().map(|a| XmlNode::Element(a.to_node())))
            .with_children(self.instances.values().map(|n| XmlNode::Element(n.to_node())))
    }

    /// Parse the part
    pub fn parse(location: &str, xml: &[u8]) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        let mut numbering = Self::new(location);

        for element in root.elements() {
            match element.name.as_str() {
                "w:abstractNum" => match AbstractNumbering::from_node(element) {
                    Some(definition) => {
                        numbering.abstract_ids.claim(definition.id);
                        numbering.abstracts.insert(definition.id, definition);
                    }
                    None => debug!("skipping w:abstractNum without id"),
                },
                "w:num" => match NumberingInstance::from_node(element) {
                    Some(instance) => {
                        numbering.instance_ids.claim(instance.id);
                        numbering.instances.insert(instance.id, instance);
                    }
                    None => debug!("skipping incomplete w:num"),
                },
                other => debug!("skipping {other} in numbering part"),
            }
        }

        for instance in numbering.instances.values() {
            if !numbering.abstracts.contains_key(&instance.abstract_id) {
                return Err(DocxError::UnknownAbstractNumbering(instance.abstract_id));
            }
        }
        Ok(numbering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullets() -> Vec<NumberingLevel> {
        vec![
            NumberingLevel::new(0, "bullet", "\u{2022}"),
            NumberingLevel::new(1, "bullet", "o"),
        ]
    }

    #[test]
    fn test_id_spaces_are_independent() {
        let mut numbering = NumberingXml::new("word/numbering.xml");
        let first = numbering.add_abstract(bullets());
        let second = numbering.add_abstract(bullets());
        assert_eq!((first, second), (0, 1));

        assert_eq!(numbering.add(second).unwrap(), 1);
        assert_eq!(numbering.add(first).unwrap(), 2);
    }

    #[test]
    fn test_unknown_abstract_is_rejected() {
        let mut numbering = NumberingXml::new("word/numbering.xml");
        assert!(matches!(
            numbering.add(4),
            Err(DocxError::UnknownAbstractNumbering(4))
        ));
        assert!(numbering.is_empty());
    }

    #[test]
    fn test_clone_and_wrap() {
        let mut numbering = NumberingXml::new("word/numbering.xml");
        let original = numbering.add_list(bullets()).unwrap();
        let copy = numbering.clone_and_wrap(original).unwrap();
        assert_ne!(original, copy);

        let copied_abstract = numbering.get(copy).unwrap().abstract_id;
        numbering
            .get_abstract_mut(copied_abstract)
            .unwrap()
            .levels[0]
            .text = Some("-".into());

        assert_eq!(
            numbering.definition_of(original).unwrap().levels[0].text.as_deref(),
            Some("\u{2022}")
        );
        assert!(matches!(
            numbering.clone_and_wrap(99),
            Err(DocxError::UnknownNumbering(99))
        ));
    }

    #[test]
    fn test_round_trip() {
        let mut numbering = NumberingXml::new("word/numbering.xml");
        let mut levels = vec![NumberingLevel::new(0, "decimal", "%1.")];
        levels[0].alignment = Some(Alignment::Left);
        let num = numbering.add_list(levels).unwrap();
        numbering.set_start_override(num, 0, 5).unwrap();

        let xml = numbering.to_node().to_xml_document().unwrap();
        let parsed = NumberingXml::parse("word/numbering.xml", &xml).unwrap();

        assert_eq!(parsed.get(num), numbering.get(num));
        assert_eq!(parsed.definition_of(num), numbering.definition_of(num));
        assert_eq!(parsed.get(num).unwrap().overrides.get(&0), Some(&5));
    }

    #[test]
    fn test_parsed_ids_are_not_reused() {
        let xml = br#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl></w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
</w:numbering>"#;
        let mut numbering = NumberingXml::parse("word/numbering.xml", xml).unwrap();
        assert_eq!(numbering.add_abstract(bullets()), 1);
        assert_eq!(numbering.add(0).unwrap(), 2);
    }

    #[test]
    fn test_dangling_instance_fails() {
        let xml = br#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:num w:numId="1"><w:abstractNumId w:val="3"/></w:num>
</w:numbering>"#;
        assert!(matches!(
            NumberingXml::parse("word/numbering.xml", xml),
            Err(DocxError::UnknownAbstractNumbering(3))
        ));
    }
}
