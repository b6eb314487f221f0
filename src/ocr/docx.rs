//! Plain-text extraction from Word (.docx) documents.
//!
//! A .docx file is a zip archive; the body lives in `word/document.xml`.
//! Only top-level body paragraphs are read (table contents are skipped),
//! joined with newlines.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Errors that can occur while reading a .docx file.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Read the body paragraphs of a .docx file, newline-joined.
pub fn read_docx_text(path: &Path) -> Result<String, DocxError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

    Ok(paragraphs_from_xml(&xml)?.join("\n"))
}

/// Collect the text of each top-level `w:p` in a WordprocessingML body.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut table_depth = 0usize;
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" if table_depth == 0 => {
                    in_paragraph = true;
                    current.clear();
                }
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if table_depth == 0 => paragraphs.push(String::new()),
                b"w:tab" if in_paragraph && in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_paragraph && in_run => current.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" if in_paragraph && table_depth == 0 => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_paragraph = false;
                }
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_paragraph && in_text => {
                current.push_str(&t.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>First &amp; foremost</w:t></w:r></w:p>
<w:p/>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>in a table</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p><w:r><w:t xml:space="preserve">Col A</w:t><w:tab/><w:t>Col B</w:t><w:br/><w:t>next line</w:t></w:r></w:p>
<w:p><w:r><w:t>नमस्ते</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
</w:body>
</w:document>"#;

    #[test]
    fn test_paragraphs_skip_tables_and_tab_stops() {
        let paragraphs = paragraphs_from_xml(BODY).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                "First & foremost".to_string(),
                String::new(),
                "Col A\tCol B\nnext line".to_string(),
                "नमस्ते world".to_string(),
            ]
        );
    }

    #[test]
    fn test_read_docx_text_from_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("letter.docx");

        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        zip.write_all(BODY.as_bytes()).unwrap();
        zip.finish().unwrap();

        let text = read_docx_text(&path).unwrap();
        assert_eq!(
            text,
            "First & foremost\n\nCol A\tCol B\nnext line\nनमस्ते world"
        );
    }

    #[test]
    fn test_not_a_docx() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, b"plain text pretending").unwrap();

        assert!(matches!(read_docx_text(&path), Err(DocxError::Zip(_))));
    }
}
