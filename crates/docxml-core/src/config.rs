//! Package writing configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! compression = "stored"
//! id_seed = 42
//! media_directory = "media"
//! prune_empty_parts = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::IdAllocator;

/// Compression applied to archive entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Deflate every entry
    #[default]
    Deflated,
    /// Store entries uncompressed
    Stored,
}

impl From<Compression> for zip::CompressionMethod {
    fn from(value: Compression) -> Self {
        match value {
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Stored => zip::CompressionMethod::Stored,
        }
    }
}

/// Settings that shape how a package is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Entry compression
    pub compression: Compression,
    /// Seed for relationship identifiers; random when absent
    pub id_seed: Option<u64>,
    /// Folder, next to the owning part, that receives embedded media
    pub media_directory: String,
    /// Leave parts without content out of the archive
    pub prune_empty_parts: bool,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            id_seed: None,
            media_directory: "media".to_string(),
            prune_empty_parts: true,
        }
    }
}

impl PackageConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Identifier allocator honoring `id_seed`
    pub fn allocator(&self) -> IdAllocator {
        match self.id_seed {
            Some(seed) => IdAllocator::seeded(seed),
            None => IdAllocator::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = PackageConfig::from_toml_str("").unwrap();
        assert_eq!(config, PackageConfig::default());
        assert!(config.prune_empty_parts);
    }

    #[test]
    fn test_parse_config() {
        let config = PackageConfig::from_toml_str(
            r#"
            compression = "stored"
            id_seed = 9
            media_directory = "images"
            "#,
        )
        .unwrap();
        assert_eq!(config.compression, Compression::Stored);
        assert_eq!(config.id_seed, Some(9));
        assert_eq!(config.media_directory, "images");
    }

    #[test]
    fn test_invalid_config() {
        assert!(PackageConfig::from_toml_str("compression = \"zstd\"").is_err());
    }
}
