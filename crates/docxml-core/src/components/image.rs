//! Inline pictures (`w:drawing`)
//!
//! ```xml
//! <w:drawing>
//!   <wp:inline>
//!     <wp:extent cx="..." cy="..."/>
//!     <wp:docPr id="..." name="..." descr="..."/>
//!     <a:graphic>
//!       <a:graphicData uri="...picture">
//!         <pic:pic>
//!           <pic:blipFill><a:blip r:embed="rIdNN"/></pic:blipFill>
//!         </pic:pic>
//!       </a:graphicData>
//!     </a:graphic>
//!   </wp:inline>
//! </w:drawing>
//! ```
//!
//! The component owns the image bytes. The media part and its relationship
//! are created by the relationship pre-walk.

use std::any::Any;

use crate::component::{Ancestry, Component, ComponentType, LinkContext, ParseContext, RenderContext};
use crate::components::Node;
use crate::error::{DocxError, Result};
use crate::length::Length;
use crate::media;
use crate::xml::{XmlElement, XmlNode};

const PICTURE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// An inline picture
#[derive(Clone, PartialEq)]
pub struct Image {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Displayed width
    pub width: Length,
    /// Displayed height
    pub height: Length,
    /// Title, from `wp:docPr/@title`
    pub title: Option<String>,
    /// Alternative text, from `wp:docPr/@descr`
    pub description: Option<String>,
    /// Relationship to the media part, set by the pre-walk
    pub relationship: Option<String>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("data", &format_args!("{} bytes", self.data.len()))
            .field("width", &self.width)
            .field("height", &self.height)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("relationship", &self.relationship)
            .finish()
    }
}

impl Image {
    /// Picture displayed at the given size
    pub fn new(data: Vec<u8>, width: Length, height: Length) -> Self {
        Self {
            data,
            width,
            height,
            title: None,
            description: None,
            relationship: None,
        }
    }

    /// Picture displayed at its pixel size at 96 DPI, when the header
    /// tells; one inch square otherwise
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let (width, height) = match media::pixel_size(&data) {
            Some((w, h)) => (Length::px(w as i64), Length::px(h as i64)),
            None => (Length::inch(1.0), Length::inch(1.0)),
        };
        Self::new(data, width, height)
    }

    /// Builder: set the alternative text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for Image {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, _ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        let embed = self.relationship.as_ref().ok_or_else(|| {
            DocxError::InvalidStructure("image rendered before its media was linked".into())
        })?;
        let id = cx.next_drawing_id();
        let name = format!("Picture {id}");
        let extent = |name: &str| {
            XmlElement::new(name)
                .with_attr("cx", self.width.as_emu())
                .with_attr("cy", self.height.as_emu())
        };

        let picture = XmlElement::new("pic:pic")
            .with_child(
                XmlElement::new("pic:nvPicPr")
                    .with_child(
                        XmlElement::new("pic:cNvPr")
                            .with_attr("id", 0)
                            .with_attr("name", &name),
                    )
                    .with_child(XmlElement::new("pic:cNvPicPr")),
            )
            .with_child(
                XmlElement::new("pic:blipFill")
                    .with_child(XmlElement::new("a:blip").with_attr("r:embed", embed))
                    .with_child(
                        XmlElement::new("a:stretch").with_child(XmlElement::new("a:fillRect")),
                    ),
            )
            .with_child(
                XmlElement::new("pic:spPr")
                    .with_child(
                        XmlElement::new("a:xfrm")
                            .with_child(XmlElement::new("a:off").with_attr("x", 0).with_attr("y", 0))
                            .with_child(extent("a:ext")),
                    )
                    .with_child(
                        XmlElement::new("a:prstGeom")
                            .with_attr("prst", "rect")
                            .with_child(XmlElement::new("a:avLst")),
                    ),
            );

        let inline = XmlElement::new("wp:inline")
            .with_attr("distT", 0)
            .with_attr("distB", 0)
            .with_attr("distL", 0)
            .with_attr("distR", 0)
            .with_child(extent("wp:extent"))
            .with_child(
                XmlElement::new("wp:docPr")
                    .with_attr("id", id)
                    .with_attr("name", &name)
                    .with_opt_attr("descr", self.description.as_ref())
                    .with_opt_attr("title", self.title.as_ref()),
            )
            .with_child(
                XmlElement::new("wp:cNvGraphicFramePr").with_child(
                    XmlElement::new("a:graphicFrameLocks").with_attr("noChangeAspect", 1),
                ),
            )
            .with_child(
                XmlElement::new("a:graphic").with_child(
                    XmlElement::new("a:graphicData")
                        .with_attr("uri", PICTURE_URI)
                        .with_child(picture),
                ),
            );

        Ok(vec![XmlElement::new("w:drawing").with_child(inline).into()])
    }

    fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        if let Some(id) = self.relationship.as_deref() {
            let linked = cx
                .relationships
                .binary_data(id)
                .is_some_and(|data| data == self.data.as_slice());
            if linked {
                cx.keep_media(id);
                return Ok(());
            }
            cx.release_media(id);
        }
        self.relationship = Some(cx.link_media(&self.data));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Image {
    const NAME: &'static str = "Image";
    const ELEMENT: Option<&'static str> = Some("w:drawing");
    const CHILDREN: &'static [&'static str] = &[];

    /// Only drawings that embed a picture; charts and shapes are skipped
    fn matches_node(element: &XmlElement) -> bool {
        element.is("w:drawing") && element.descendant("a:blip").is_some()
    }

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        let blip = element
            .descendant("a:blip")
            .ok_or_else(|| DocxError::InvalidStructure("drawing without a:blip".into()))?;
        let id = blip
            .attr("r:embed")
            .ok_or_else(|| DocxError::InvalidStructure("a:blip without r:embed".into()))?;
        let data = cx
            .relationships
            .binary_data(id)
            .ok_or_else(|| DocxError::UnknownRelationship(id.to_string()))?;

        let extent = element.descendant("wp:extent");
        let size = |name: &str| {
            extent
                .and_then(|e| e.attr_parsed::<i64>(name))
                .map(Length::emu)
                .unwrap_or(Length::ZERO)
        };
        let properties = element.descendant("wp:docPr");

        Ok(Self {
            data: data.to_vec(),
            width: size("cx"),
            height: size("cy"),
            title: properties.and_then(|p| p.attr("title")).map(str::to_string),
            description: properties.and_then(|p| p.attr("descr")).map(str::to_string),
            relationship: Some(id.to_string()),
        })
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::Relationships;
    use crate::test_utils::{parse_fragment_in, render_one, tiny_png};

    #[test]
    fn test_from_bytes_uses_pixel_size() {
        let image = Image::from_bytes(tiny_png());
        assert_eq!(image.width, Length::px(1));
        assert_eq!(image.height, Length::px(1));
    }

    #[test]
    fn test_render_requires_link() {
        let image = Image::from_bytes(tiny_png());
        let mut cx = RenderContext::new();
        assert!(image.to_nodes(&mut cx, &Ancestry::root()).is_err());
    }

    #[test]
    fn test_link_render_parse() {
        let mut rels = Relationships::new("word/document.xml");
        let mut image = Image::from_bytes(tiny_png()).with_description("A dot");
        image
            .ensure_relationships(&mut LinkContext::new(&mut rels, "media"))
            .unwrap();
        let id = image.relationship.clone().unwrap();

        // Linking again keeps the relationship
        image
            .ensure_relationships(&mut LinkContext::new(&mut rels, "media"))
            .unwrap();
        assert_eq!(image.relationship.as_deref(), Some(id.as_str()));
        assert_eq!(rels.len(), 1);

        let drawing = render_one(&image, &Ancestry::root());
        assert_eq!(
            drawing.descendant("a:blip").and_then(|b| b.attr("r:embed")),
            Some(id.as_str())
        );
        assert_eq!(
            drawing.descendant("wp:docPr").and_then(|d| d.attr("id")),
            Some("1")
        );

        let xml = drawing.to_xml_string().unwrap();
        let parsed: Image = parse_fragment_in(&xml, &rels);
        assert_eq!(parsed, image);
    }

    #[test]
    fn test_parse_unknown_embed_fails() {
        let rels = Relationships::new("word/document.xml");
        let xml = r#"<w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="rId404"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#;
        let result = crate::test_utils::try_parse_fragment_in::<Image>(xml, &rels);
        assert!(matches!(result, Err(DocxError::UnknownRelationship(id)) if id == "rId404"));
    }
}
