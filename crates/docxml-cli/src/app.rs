//! CLI Application logic
//!
//! Each command builds its report as a string so it can be tested without
//! capturing stdout; `run_cli` prints it.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};
use serde::Serialize;

use docxml_core::content_types::CONTENT_TYPES_PATH;
use docxml_core::{
    ContentTypes, Docx, Node, PackageArchive, PackageConfig, Relationships, Table,
};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "docxml")]
#[command(author, version, about = "Inspect and rewrite .docx packages", long_about = None)]
struct Cli {
    /// Package configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List parts, relationships and content types of a package
    Inspect {
        /// Input DOCX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the text of the document body, one block per line
    Text {
        /// Input DOCX file
        input: PathBuf,
    },

    /// Show the grid layout of every top-level table
    Tables {
        /// Input DOCX file
        input: PathBuf,
    },

    /// Read a package and write it back out
    Roundtrip {
        /// Input DOCX file
        input: PathBuf,

        /// Output DOCX file
        output: PathBuf,
    },
}

/// Run the CLI application
///
/// Parses arguments, sets up logging and dispatches to the command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { input, format } => {
            print!("{}", inspect_command(&input, &config, format)?);
        }
        Commands::Text { input } => {
            print!("{}", text_command(&input, &config)?);
        }
        Commands::Tables { input } => {
            print!("{}", tables_command(&input, &config)?);
        }
        Commands::Roundtrip { input, output } => {
            roundtrip_command(&input, &output, &config)?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}

/// Configuration from `path`, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<PackageConfig> {
    match path {
        Some(path) => PackageConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => Ok(PackageConfig::default()),
    }
}

fn open_archive(input: &Path) -> Result<PackageArchive> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    PackageArchive::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))
}

fn open_docx(input: &Path, config: &PackageConfig) -> Result<Docx> {
    let archive = open_archive(input)?;
    Docx::from_archive(&archive, config.clone())
        .with_context(|| format!("Failed to read package: {}", input.display()))
}

#[derive(Debug, Serialize)]
struct PackageReport {
    parts: Vec<PartReport>,
    relationships: Vec<RelationshipReport>,
    content_types: Vec<ContentTypeReport>,
}

#[derive(Debug, Serialize)]
struct PartReport {
    location: String,
    kind: &'static str,
    content_type: String,
}

#[derive(Debug, Serialize)]
struct RelationshipReport {
    source: String,
    id: String,
    kind: String,
    target: String,
    external: bool,
}

#[derive(Debug, Serialize)]
struct ContentTypeReport {
    name: String,
    content_type: String,
    default: bool,
}

fn relationship_reports(rels: &Relationships) -> Vec<RelationshipReport> {
    let source = if rels.location().is_empty() {
        "/".to_string()
    } else {
        rels.location().to_string()
    };
    rels.metas()
        .iter()
        .map(|meta| RelationshipReport {
            source: source.clone(),
            id: meta.id.clone(),
            kind: meta
                .rel_type
                .uri()
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string(),
            target: meta.target.clone(),
            external: meta.external,
        })
        .collect()
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, config: &PackageConfig, format: OutputFormat) -> Result<String> {
    let archive = open_archive(input)?;
    let content_types = ContentTypes::parse(
        archive
            .require(CONTENT_TYPES_PATH)
            .context("Package has no content types")?,
    )?;
    let docx = Docx::from_archive(&archive, config.clone())
        .with_context(|| format!("Failed to read package: {}", input.display()))?;

    let mut relationships = relationship_reports(docx.relationships());
    let mut parts = Vec::new();
    for part in docx.parts() {
        debug!("inspecting {}", part.location());
        parts.push(PartReport {
            location: part.location().to_string(),
            kind: part.kind(),
            content_type: part.content_type().to_string(),
        });
        if let Some(rels) = part.relationships() {
            relationships.extend(relationship_reports(rels));
        }
    }

    let content_types = content_types
        .defaults()
        .map(|(ext, ty)| ContentTypeReport {
            name: ext.to_string(),
            content_type: ty.to_string(),
            default: true,
        })
        .chain(content_types.overrides().map(|(name, ty)| ContentTypeReport {
            name: format!("/{name}"),
            content_type: ty.to_string(),
            default: false,
        }))
        .collect();

    let report = PackageReport {
        parts,
        relationships,
        content_types,
    };

    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(render_package_report(&report)),
    }
}

fn render_package_report(report: &PackageReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Parts ({}):", report.parts.len());
    for part in &report.parts {
        let _ = writeln!(out, "  {:<28} {:<10} {}", part.location, part.kind, part.content_type);
    }

    let _ = writeln!(out, "\nRelationships ({}):", report.relationships.len());
    for rel in &report.relationships {
        let external = if rel.external { " (external)" } else { "" };
        let _ = writeln!(
            out,
            "  {} {} -> {} [{}]{external}",
            rel.source, rel.id, rel.target, rel.kind
        );
    }

    let _ = writeln!(out, "\nContent types ({}):", report.content_types.len());
    for entry in &report.content_types {
        let label = if entry.default { "default " } else { "override" };
        let _ = writeln!(out, "  {label} {:<28} {}", entry.name, entry.content_type);
    }

    out
}

/// Execute the text command
pub fn text_command(input: &Path, config: &PackageConfig) -> Result<String> {
    let docx = open_docx(input, config)?;
    let mut out = String::new();
    for block in docx.document()?.blocks() {
        match block {
            Node::Table(table) => {
                for row in &table.rows {
                    let cells: Vec<String> = row
                        .cells
                        .iter()
                        .map(|cell| cell_text(&cell.children))
                        .collect();
                    let _ = writeln!(out, "{}", cells.join("\t"));
                }
            }
            other => {
                let _ = writeln!(out, "{}", other.text());
            }
        }
    }
    Ok(out)
}

fn cell_text(children: &[Node]) -> String {
    children
        .iter()
        .map(Node::text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute the tables command
pub fn tables_command(input: &Path, config: &PackageConfig) -> Result<String> {
    let docx = open_docx(input, config)?;
    let tables: Vec<&Table> = docx
        .document()?
        .blocks()
        .filter_map(|block| match block {
            Node::Table(table) => Some(table),
            _ => None,
        })
        .collect();

    let mut out = String::new();
    if tables.is_empty() {
        out.push_str("No tables\n");
    }
    for (index, table) in tables.iter().enumerate() {
        let model = table.model();
        let _ = writeln!(
            out,
            "Table {}: {} columns x {} rows",
            index + 1,
            model.width(),
            model.height()
        );
        for info in model.cells() {
            let _ = writeln!(
                out,
                "  cell ({}, {}) at column {} row {}, span {}x{}",
                info.row_index, info.cell_index, info.column, info.row, info.col_span, info.row_span
            );
        }
        match model.check_rectangular() {
            Ok(()) => out.push_str("  rectangular\n"),
            Err(err) => {
                let _ = writeln!(out, "  not rectangular: {err}");
            }
        }
    }
    Ok(out)
}

/// Execute the roundtrip command
pub fn roundtrip_command(input: &Path, output: &Path, config: &PackageConfig) -> Result<()> {
    let mut docx = open_docx(input, config)?;
    docx.save(output)
        .with_context(|| format!("Failed to write DOCX file: {}", output.display()))
}
