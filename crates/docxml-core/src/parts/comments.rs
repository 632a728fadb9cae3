//! The comments part
//!
//! Comment bodies are ordinary paragraph trees, so rendering and parsing go
//! through the component registry like the main document does.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};

use crate::bookmarks::Bookmarks;
use crate::component::{
    check_children, link_children, render_children, Ancestry, LinkContext, ParseContext,
    RenderContext,
};
use crate::components::{Node, Paragraph};
use crate::content_types::content_type;
use crate::error::{DocxError, Result};
use crate::ids::KeyAllocator;
use crate::registry::ComponentRegistry;
use crate::relationships::Relationships;
use crate::xml::XmlElement;

const BODY: &[&str] = &["Paragraph", "Table"];

/// One comment (`w:comment`)
#[derive(Debug, Clone, PartialEq)]
pub struct CommentEntry {
    /// Comment id, referenced from the body
    pub id: u32,
    /// Author display name
    pub author: String,
    /// Author initials
    pub initials: Option<String>,
    /// Time the comment was made
    pub date: Option<DateTime<Utc>>,
    /// Comment body
    pub children: Vec<Node>,
}

impl CommentEntry {
    fn to_node(&self, cx: &mut RenderContext) -> Result<XmlElement> {
        check_children("CommentEntry", BODY, false, &self.children)?;
        let children = render_children(&self.children, cx, &Ancestry::root())?;
        Ok(XmlElement::new("w:comment")
            .with_attr("w:id", self.id)
            .with_attr("w:author", &self.author)
            .with_opt_attr(
                "w:date",
                self.date
                    .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true)),
            )
            .with_opt_attr("w:initials", self.initials.as_ref())
            .with_children(children))
    }

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        let id = element
            .attr_parsed("w:id")
            .ok_or_else(|| DocxError::InvalidValue {
                attribute: "w:comment/@w:id".into(),
                value: element.attr("w:id").unwrap_or_default().to_string(),
            })?;
        let date = element.attr("w:date").and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(date) => Some(date.with_timezone(&Utc)),
                Err(err) => {
                    warn!("ignoring unparsable date {raw:?} of comment {id}: {err}");
                    None
                }
            }
        });
        Ok(Self {
            id,
            author: element.attr("w:author").unwrap_or_default().to_string(),
            initials: element.attr("w:initials").map(str::to_string),
            date,
            children: cx.parse_children(element, BODY)?,
        })
    }
}

/// `word/comments.xml`
#[derive(Debug, Clone)]
pub struct CommentsXml {
    location: String,
    /// Media and hyperlinks used by comment bodies
    pub relationships: Relationships,
    comments: BTreeMap<u32, CommentEntry>,
    ids: KeyAllocator,
}

impl CommentsXml {
    /// Content type of the part
    pub const CONTENT_TYPE: &'static str = content_type::WML_COMMENTS;

    /// Empty comments part at `location`
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            relationships: Relationships::new(location),
            comments: BTreeMap::new(),
            ids: KeyAllocator::default(),
        }
    }

    /// Location inside the archive
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Add a comment and return its id
    pub fn add(
        &mut self,
        author: impl Into<String>,
        date: Option<DateTime<Utc>>,
        children: Vec<Node>,
    ) -> u32 {
        let id = self.ids.next();
        self.comments.insert(
            id,
            CommentEntry {
                id,
                author: author.into(),
                initials: None,
                date,
                children,
            },
        );
        id
    }

    /// Add a comment whose body is one paragraph of plain text
    pub fn add_text(&mut self, author: impl Into<String>, text: impl Into<String>) -> u32 {
        self.add(author, None, vec![Paragraph::with_text(text).into()])
    }

    /// Comment by id
    pub fn get(&self, id: u32) -> Option<&CommentEntry> {
        self.comments.get(&id)
    }

    /// Mutable comment by id
    pub fn get_mut(&mut self, id: u32) -> Option<&mut CommentEntry> {
        self.comments.get_mut(&id)
    }

    /// Whether comment `id` exists
    pub fn has(&self, id: u32) -> bool {
        self.comments.contains_key(&id)
    }

    /// Every comment id, ascending
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.comments.keys().copied()
    }

    /// Comments in id order
    pub fn iter(&self) -> impl Iterator<Item = &CommentEntry> {
        self.comments.values()
    }

    /// Number of comments
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Whether there are no comments
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Remove a comment, freeing its id
    pub fn remove(&mut self, id: u32) -> Option<CommentEntry> {
        self.ids.release(id);
        self.comments.remove(&id)
    }

    pub(crate) fn link(&mut self, media_directory: &str) -> Result<()> {
        let mut cx = LinkContext::new(&mut self.relationships, media_directory);
        for comment in self.comments.values_mut() {
            link_children(&mut comment.children, &mut cx)?;
        }
        cx.finish();
        Ok(())
    }

    /// Render `w:comments`
    pub fn to_node(&self, cx: &mut RenderContext) -> Result<XmlElement> {
        let mut root = XmlElement::new("w:comments");
        for comment in self.comments.values() {
            root.push(comment.to_node(cx)?);
        }
        Ok(root)
    }

    /// Parse the part
    pub fn parse(
        location: &str,
        xml: &[u8],
        relationships: Relationships,
        registry: &ComponentRegistry,
        bookmarks: &mut Bookmarks,
    ) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        let mut comments = BTreeMap::new();
        let mut ids = KeyAllocator::default();
        {
            let mut cx = ParseContext {
                registry,
                relationships: &relationships,
                bookmarks,
            };
            for element in root.elements() {
                if !element.is("w:comment") {
                    debug!("skipping {} in comments part", element.name);
                    continue;
                }
                let entry = CommentEntry::from_node(element, &mut cx)?;
                ids.claim(entry.id);
                comments.insert(entry.id, entry);
            }
        }

        Ok(Self {
            location: location.to_string(),
            relationships,
            comments,
            ids,
        })
    }
}
