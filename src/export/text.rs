//! Plain-text based export encodings: txt, md, csv.

use std::io::{self, Write};

/// Heading placed above Markdown exports.
pub const MARKDOWN_HEADING: &str = "# OCR Result";

/// Header of the single CSV column.
pub const CSV_HEADER: &str = "Content";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn write_txt<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())
}

pub fn write_markdown<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    write!(out, "{}\n\n{}", MARKDOWN_HEADING, text)
}

/// One row per non-blank line, UTF-8 with BOM so spreadsheet apps pick the encoding.
pub fn write_csv<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(UTF8_BOM)?;
    writeln!(out, "{}", CSV_HEADER)?;
    for line in csv_rows(text) {
        writeln!(out, "{}", escape_csv(line))?;
    }
    Ok(())
}

/// Lines of `text` that contain something other than whitespace.
pub fn csv_rows(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').filter(|line| !line.trim().is_empty())
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
