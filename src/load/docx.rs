//! Word document extraction
//!
//! A .docx file is a zip archive; the body text lives in
//! `word/document.xml` as `<w:t>` runs grouped into `<w:p>` paragraphs.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub fn load(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::Load(format!("'{}' is not a valid Word archive: {e}", path.display())))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::Load(format!("'{}' has no document body: {e}", path.display())))?
        .read_to_string(&mut xml)?;

    let text = extract_paragraphs(&xml)?;
    if text.trim().is_empty() {
        return Err(Error::Load(format!(
            "'{}' contains no extractable text",
            path.display()
        )));
    }

    debug!("Extracted {} chars from Word document", text.len());
    Ok(text)
}

/// Pull `<w:t>` run text out of document XML, one line per paragraph
fn extract_paragraphs(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:t" => in_run = false,
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => out.push('\n'),
            Ok(Event::Text(t)) if in_run => {
                let run = t
                    .unescape()
                    .map_err(|e| Error::Load(format!("bad text run in document XML: {e}")))?;
                out.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Load(format!("malformed document XML: {e}"))),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const DOC_XML: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn write_docx(path: &Path, document_xml: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn test_extracts_paragraphs_from_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        write_docx(&path, DOC_XML);

        let text = load(&path).unwrap();
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines, vec!["First paragraph", "Second paragraph"]);
    }

    #[test]
    fn test_rejects_non_zip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "plain text, not a zip").unwrap();

        assert!(matches!(load(&path), Err(Error::Load(_))));
    }

    #[test]
    fn test_rejects_empty_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        write_docx(
            &path,
            r#"<w:document xmlns:w="ns"><w:body></w:body></w:document>"#,
        );

        assert!(matches!(load(&path), Err(Error::Load(_))));
    }
}
