//! Archive handling for DOCX/DOTX files
//!
//! DOCX and DOTX files are ZIP archives containing XML files and resources.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::config::Compression;
use crate::error::{DocxError, Result};

/// An unpacked OOXML package
#[derive(Debug, Clone, Default)]
pub struct PackageArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl PackageArchive {
    /// Empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a DOCX/DOTX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack an archive held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a file that must exist
    ///
    /// The error lists every entry the archive does contain.
    pub fn require(&self, path: &str) -> Result<&[u8]> {
        self.get(path).ok_or_else(|| DocxError::MissingFile {
            path: path.to_string(),
            available: self.file_list(),
        })
    }

    /// Get a file's contents as a string
    pub fn get_string(&self, path: &str) -> Result<Option<String>> {
        match self.files.get(path) {
            Some(bytes) => Ok(Some(String::from_utf8(bytes.clone())?)),
            None => Ok(None),
        }
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// All file names, sorted
    pub fn file_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the archive holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Set or update a file's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a file's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Remove a file from the archive
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Write the archive to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, compression: Compression) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file, compression)
    }

    /// Pack the archive into memory
    pub fn to_bytes(&self, compression: Compression) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer, compression)?;
        Ok(buffer.into_inner())
    }

    /// Write the archive to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W, compression: Compression) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(compression.into());

        // Sort keys for deterministic output
        let mut paths: Vec<_> = self.files.keys().collect();
        paths.sort();

        for path in paths {
            let contents = &self.files[path];
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_operations() {
        let mut archive = PackageArchive::new();

        archive.set_string("test.xml", "<root/>");
        assert!(archive.contains("test.xml"));
        assert_eq!(
            archive.get_string("test.xml").unwrap(),
            Some("<root/>".to_string())
        );

        archive.remove("test.xml");
        assert!(!archive.contains("test.xml"));
        assert!(archive.is_empty());
    }

    #[test]
    fn test_missing_file_lists_entries() {
        let mut archive = PackageArchive::new();
        archive.set_string("b.xml", "<b/>");
        archive.set_string("a.xml", "<a/>");

        match archive.require("word/document.xml") {
            Err(DocxError::MissingFile { path, available }) => {
                assert_eq!(path, "word/document.xml");
                assert_eq!(available, vec!["a.xml", "b.xml"]);
            }
            other => panic!("expected MissingFile, got {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip_through_bytes() {
        let mut archive = PackageArchive::new();
        archive.set_string("word/document.xml", "<w:document/>");
        archive.set("word/media/x.bin", vec![0, 1, 2, 255]);

        for compression in [Compression::Deflated, Compression::Stored] {
            let bytes = archive.to_bytes(compression).unwrap();
            let restored = PackageArchive::from_bytes(&bytes).unwrap();
            assert_eq!(restored.file_list(), archive.file_list());
            assert_eq!(restored.get("word/media/x.bin"), Some(&[0u8, 1, 2, 255][..]));
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let mut archive = PackageArchive::new();
        archive.set("bad.xml", vec![0xff, 0xfe]);
        assert!(matches!(archive.get_string("bad.xml"), Err(DocxError::Utf8(_))));
    }
}
