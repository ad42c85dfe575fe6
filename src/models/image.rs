use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};

/// An in-memory image file selected for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> ImageBlob {
        ImageBlob {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Reads a file from disk, deriving the MIME type from the extension.
    /// Unknown extensions get an `application/octet-stream` type and are
    /// rejected later by the staging checks.
    pub fn from_path(path: &Path) -> Result<ImageBlob> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("invalid file name: {}", path.display()))?
            .to_string();
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") => "image/jpg",
            Some("jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        };
        Ok(ImageBlob::new(name, mime, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
