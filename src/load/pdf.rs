//! PDF text extraction, compiled behind the `pdf` feature

use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

pub fn load(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| Error::Load(format!("failed to extract PDF text: {e}")))?;

    if text.trim().is_empty() {
        return Err(Error::Load(format!(
            "'{}' contains no extractable text (scanned pages are not supported)",
            path.display()
        )));
    }

    debug!("Extracted {} chars of PDF text", text.len());
    Ok(text)
}
