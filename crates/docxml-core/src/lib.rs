//! # docxml-core
//!
//! Typed component model for OOXML WordprocessingML (`.docx`) packages.
//!
//! This crate provides functionality to:
//! - Build documents as a tree of components (sections, paragraphs, runs,
//!   tables, images, hyperlinks, tracked changes, comments, bookmarks)
//! - Write them as a package with relationships, content types and the
//!   supporting parts (styles, settings, numbering, comments, headers,
//!   footers, media) created on demand
//! - Read existing packages back into the same tree, keeping parts this
//!   crate does not model verbatim
//!
//! ## Example: Writing a Document
//!
//! ```no_run
//! use docxml_core::{Docx, Paragraph};
//!
//! let mut docx = Docx::new();
//! docx.document_mut()?.push(Paragraph::with_text("hello"));
//! docx.save("hello.docx")?;
//!
//! let reopened = Docx::open("hello.docx")?;
//! for block in reopened.document()?.blocks() {
//!     println!("{}", block.text());
//! }
//! # Ok::<(), docxml_core::DocxError>(())
//! ```

pub mod archive;
pub mod bookmarks;
pub mod component;
pub mod components;
pub mod config;
pub mod content_types;
pub mod docx;
pub mod error;
pub mod ids;
pub mod length;
pub mod media;
pub mod parts;
pub mod paths;
pub mod properties;
pub mod registry;
pub mod relationships;
pub mod styles;
pub mod table_model;
pub mod template;
pub mod xml;

#[cfg(test)]
mod test_utils;

pub use archive::PackageArchive;
pub use bookmarks::Bookmarks;
pub use component::{Ancestry, Component, ComponentType, LinkContext, ParseContext, RenderContext};
pub use components::{
    BookmarkRangeEnd, BookmarkRangeStart, Break, BreakType, Cell, Comment, CommentRangeEnd,
    CommentRangeStart, Deletion, Hyperlink, HyperlinkTarget, Image, Insertion, Node, Paragraph, Row,
    Section, Symbol, Tab, Table, Text,
};
pub use config::{Compression, PackageConfig};
pub use content_types::ContentTypes;
pub use docx::Docx;
pub use error::{DocxError, Result};
pub use ids::{IdAllocator, KeyAllocator};
pub use length::Length;
pub use parts::{
    CommentsXml, DocumentXml, HeaderFooterXml, NumberingLevel, NumberingXml, Part, SettingsXml,
    StylesXml,
};
pub use registry::{ComponentRegistry, RegistryBuilder};
pub use relationships::{RelationshipType, Relationships};
pub use styles::{Style, StyleSheet, StyleType};
pub use table_model::{RowLayout, TableGridModel, MAX_GRID_SPAN};
pub use template::Template;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
