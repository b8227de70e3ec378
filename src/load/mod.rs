//! Document loading
//!
//! Turns files on disk into plain text plus descriptive metadata. Each
//! supported format has its own loader; anything with an unknown extension
//! gets one best-effort attempt as plain text before being rejected.

mod docx;
#[cfg(feature = "pdf")]
mod pdf;
mod sheet;
mod text;

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Word,
    Csv,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt" | "md" | "rst" | "log" => Some(FileKind::Text),
            "pdf" => Some(FileKind::Pdf),
            "docx" | "doc" => Some(FileKind::Word),
            "csv" => Some(FileKind::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Text => "text",
            FileKind::Pdf => "pdf",
            FileKind::Word => "word",
            FileKind::Csv => "csv",
        }
    }
}

/// Extensions the loader understands
pub fn supported_extensions() -> &'static [&'static str] {
    &["txt", "md", "rst", "log", "pdf", "docx", "doc", "csv"]
}

/// Descriptive metadata captured at load time
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub file_size: u64,
    pub extension: String,
    pub kind: FileKind,
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
}

impl DocumentMetadata {
    /// Flatten into a payload map for the index
    pub fn to_extra(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("file_size".to_string(), Value::Number(self.file_size.into()));
        map.insert(
            "extension".to_string(),
            Value::String(self.extension.clone()),
        );
        map.insert(
            "kind".to_string(),
            Value::String(self.kind.as_str().to_string()),
        );
        map.insert(
            "char_count".to_string(),
            Value::Number((self.char_count as u64).into()),
        );
        map.insert(
            "word_count".to_string(),
            Value::Number((self.word_count as u64).into()),
        );
        map.insert(
            "line_count".to_string(),
            Value::Number((self.line_count as u64).into()),
        );
        map
    }
}

/// Load a file into plain text with metadata
pub fn load_document(path: &Path) -> Result<(String, DocumentMetadata)> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let file_size = std::fs::metadata(path)?.len();

    let (content, kind) = match FileKind::from_extension(&extension) {
        Some(FileKind::Text) => (text::load(path)?, FileKind::Text),
        Some(FileKind::Pdf) => (load_pdf(path)?, FileKind::Pdf),
        Some(FileKind::Word) => {
            if extension == "doc" {
                warn!(
                    "'{}' is a legacy .doc file, extraction is best-effort",
                    file_name
                );
            }
            (docx::load(path)?, FileKind::Word)
        }
        Some(FileKind::Csv) => (sheet::load(path)?, FileKind::Csv),
        None => {
            // One attempt as plain text before giving up
            debug!("Unknown extension '.{}', trying as plain text", extension);
            match text::load(path) {
                Ok(content) if !content.trim().is_empty() => (content, FileKind::Text),
                _ => {
                    return Err(Error::UnsupportedFileType(format!(
                        "'{file_name}' has unsupported extension '.{extension}'"
                    )))
                }
            }
        }
    };

    let metadata = DocumentMetadata {
        file_name,
        file_size,
        extension,
        kind,
        char_count: content.chars().count(),
        word_count: content.split_whitespace().count(),
        line_count: content.lines().count(),
    };

    debug!(
        "Loaded '{}' ({} chars, {} words)",
        metadata.file_name, metadata.char_count, metadata.word_count
    );
    Ok((content, metadata))
}

#[cfg(feature = "pdf")]
fn load_pdf(path: &Path) -> Result<String> {
    pdf::load(path)
}

#[cfg(not(feature = "pdf"))]
fn load_pdf(path: &Path) -> Result<String> {
    Err(Error::UnsupportedFileType(format!(
        "'{}' requires the 'pdf' feature",
        path.display()
    )))
}
