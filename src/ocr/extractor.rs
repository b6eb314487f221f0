//! Text extraction dispatch by input type.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::backend::{check_binary, OcrBackend, OcrError};
use super::docx::{read_docx_text, DocxError};
use super::language::OcrLanguage;
use super::preprocess::preprocess_image;
use super::scanner::{DocumentScanner, PdfSource, PopplerPdf, ScanError, ScanOptions};
use super::tesseract::TesseractBackend;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File is not valid UTF-8 text")]
    InvalidEncoding,

    #[error("PDF scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Image decoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Word document could not be read: {0}")]
    Docx(#[from] DocxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Kinds of input the extractor understands, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Image,
    Docx,
    Text,
}

impl InputKind {
    /// Map a (case-insensitive) extension to an input kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(InputKind::Pdf),
            "png" | "jpg" | "jpeg" => Some(InputKind::Image),
            "docx" => Some(InputKind::Docx),
            "txt" => Some(InputKind::Text),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Extracts text from uploaded files using the configured OCR backend and PDF source.
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Arc<dyn OcrBackend>,
    pdf: Arc<dyn PdfSource>,
    options: ScanOptions,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(Arc::new(TesseractBackend::new()), Arc::new(PopplerPdf::new()))
    }
}

impl TextExtractor {
    pub fn new(ocr: Arc<dyn OcrBackend>, pdf: Arc<dyn PdfSource>) -> Self {
        Self {
            ocr,
            pdf,
            options: ScanOptions::default(),
        }
    }

    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract text from a file. Blocking; may run external tools.
    pub fn extract(
        &self,
        file_path: &Path,
        kind: InputKind,
        language: OcrLanguage,
    ) -> Result<String, ExtractionError> {
        match kind {
            InputKind::Pdf => {
                let scanner = DocumentScanner::new(self.pdf.as_ref(), self.ocr.as_ref(), self.options);
                Ok(scanner.scan(file_path, language)?.text)
            }
            InputKind::Image => {
                // decoder chosen from the content, not the extension
                let image = image::ImageReader::open(file_path)?
                    .with_guessed_format()?
                    .decode()?;
                let result = self.ocr.recognize(&preprocess_image(&image), language)?;
                tracing::debug!(
                    "{} OCR of {} took {}ms",
                    result.backend,
                    file_path.display(),
                    result.processing_time_ms
                );
                Ok(result.text)
            }
            InputKind::Docx => Ok(read_docx_text(file_path)?),
            InputKind::Text => {
                let bytes = std::fs::read(file_path)?;
                String::from_utf8(bytes).map_err(|_| ExtractionError::InvalidEncoding)
            }
        }
    }

    /// Extract text, inferring the input kind from the file extension.
    pub fn extract_path(
        &self,
        file_path: &Path,
        language: OcrLanguage,
    ) -> Result<String, ExtractionError> {
        let kind = InputKind::from_path(file_path).ok_or_else(|| {
            ExtractionError::UnsupportedFileType(file_path.display().to_string())
        })?;
        self.extract(file_path, kind, language)
    }

    /// Check if required tools are available.
    pub fn check_tools() -> Vec<(String, bool)> {
        ["pdfinfo", "pdftotext", "pdftoppm", "tesseract"]
            .iter()
            .map(|tool| (tool.to_string(), check_binary(tool)))
            .collect()
    }
}
