//! Minimal WordprocessingML writer: one paragraph holding the whole text.

use std::io::{Seek, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r>"#;

const DOCUMENT_CLOSE: &str = "</w:r></w:p><w:sectPr/></w:body></w:document>";

/// Write `text` as a .docx package containing a single paragraph.
///
/// Line breaks become `w:br` and tabs `w:tab` inside the paragraph's run.
pub fn write_docx<W: Write + Seek>(out: W, text: &str) -> zip::result::ZipResult<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(out);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml(text).as_bytes())?;

    zip.finish()?;
    Ok(())
}

fn document_xml(text: &str) -> String {
    let mut xml = String::with_capacity(DOCUMENT_OPEN.len() + text.len() * 2);
    xml.push_str(DOCUMENT_OPEN);

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                xml.push_str("<w:tab/>");
            }
            if segment.is_empty() {
                continue;
            }
            // XML 1.0 forbids most control characters
            let cleaned: String = segment.chars().filter(|c| !c.is_control()).collect();
            xml.push_str(r#"<w:t xml:space="preserve">"#);
            xml.push_str(&escape(cleaned.as_str()));
            xml.push_str("</w:t>");
        }
    }

    xml.push_str(DOCUMENT_CLOSE);
    xml
}
