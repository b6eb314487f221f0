//! OCR and text extraction module.
//!
//! Extracts text from uploaded files using:
//! - pdftotext (Poppler) for PDF pages that carry digital text
//! - pdftoppm (Poppler) + Tesseract OCR for scanned or handwritten PDF pages
//! - Tesseract OCR for image files, after grayscale + sharpen preprocessing
//! - A zip/XML reader for Word documents
//!
//! ## OCR Backends
//!
//! Tesseract is the only shipped backend. Anything implementing
//! [`OcrBackend`] can be plugged into [`TextExtractor`].

mod backend;
mod docx;
mod extractor;
mod language;
mod preprocess;
mod scanner;
mod tesseract;

pub use backend::{check_binary, OcrBackend, OcrError, OcrResult};
pub use docx::{read_docx_text, DocxError};
pub use extractor::{ExtractionError, InputKind, TextExtractor};
pub use language::OcrLanguage;
pub use preprocess::preprocess_image;
pub use scanner::{
    DocumentScanner, PageMethod, PdfSource, PopplerPdf, ScanError, ScanOptions, ScanReport,
    DEFAULT_DIGITAL_TEXT_MIN_CHARS, DEFAULT_RENDER_DPI,
};
pub use tesseract::TesseractBackend;

#[cfg(test)]
pub(crate) use scanner::tests::{FakeOcr, FakePdf};
