//! Error types for package and component operations

use thiserror::Error;

/// Errors that can occur while building, reading or writing a package
#[derive(Error, Debug)]
pub enum DocxError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// Part content is not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Required file not found in archive
    #[error("Required file not found: {path} (archive contains: {})", available.join(", "))]
    MissingFile {
        /// The requested entry
        path: String,
        /// Every entry actually present in the archive
        available: Vec<String>,
    },

    /// A component was rendered outside of the structure it requires
    #[error("{component} must be rendered inside a {ancestor}")]
    MissingAncestor {
        /// Component being rendered
        component: &'static str,
        /// Required ancestor kind
        ancestor: &'static str,
    },

    /// The rows of a table do not describe a rectangular grid
    #[error("Table row {row} spans {actual} columns, expected {expected}")]
    NonRectangularTable {
        /// Zero-based row index
        row: usize,
        /// Column count of the first row
        expected: usize,
        /// Column count of the offending row
        actual: usize,
    },

    /// A cell spans more rows than the table has below it
    #[error("Cell {cell} of table row {row} spans {row_span} rows, only {available} remain")]
    RowSpanOverflow {
        /// Zero-based row index
        row: usize,
        /// Zero-based cell index within the row
        cell: usize,
        /// Declared row span
        row_span: usize,
        /// Rows from the cell's row to the end of the table
        available: usize,
    },

    /// A child kind that its parent does not accept
    #[error("{parent} cannot contain {child}")]
    IllegalChild {
        /// Parent component name
        parent: &'static str,
        /// Offending child component name
        child: &'static str,
    },

    /// A legal-children name that no registered component answers to
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    /// Relationship type without a handler or passthrough
    #[error("Unknown relationship type: {0}")]
    UnknownRelationshipType(String),

    /// Relationship id missing from the enclosing part
    #[error("Unknown relationship: {0}")]
    UnknownRelationship(String),

    /// Comment reference to a comment that was never added
    #[error("Unknown comment: {0}")]
    UnknownComment(u32),

    /// Bookmark identifier used twice
    #[error("Duplicate bookmark identifier: {0}")]
    DuplicateBookmark(u32),

    /// Style identifier used twice
    #[error("Duplicate style identifier: {0}")]
    DuplicateStyle(String),

    /// Style not found
    #[error("Style not found: {0}")]
    StyleNotFound(String),

    /// Concrete numbering pointing at a missing abstract definition
    #[error("Unknown abstract numbering: {0}")]
    UnknownAbstractNumbering(u32),

    /// Numbering instance not found
    #[error("Unknown numbering: {0}")]
    UnknownNumbering(u32),

    /// The package root has no `officeDocument` relationship
    #[error("Package has no officeDocument relationship")]
    MissingOfficeDocument,

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// An attribute value that cannot be interpreted
    #[error("Invalid value {value:?} for {attribute}")]
    InvalidValue {
        /// Qualified attribute name
        attribute: String,
        /// Raw value
        value: String,
    },
}

/// Result type for package operations
pub type Result<T> = std::result::Result<T, DocxError>;
