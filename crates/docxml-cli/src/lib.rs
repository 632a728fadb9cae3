//! docxml CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docxml:
//! - Inspect: list parts, relationships and content types
//! - Text: dump the body text
//! - Tables: show the grid layout of each table
//! - Roundtrip: read a package and write it back
//!
//! # Binary Usage
//!
//! ```bash
//! docxml inspect report.docx --format json
//! docxml text report.docx
//! docxml tables report.docx
//! docxml --config docxml.toml roundtrip report.docx copy.docx
//! ```

pub mod app;

pub use app::{
    inspect_command, load_config, roundtrip_command, run_cli, tables_command, text_command,
    OutputFormat,
};
