//! Upload-to-artifact conversion.
//!
//! Validates an upload, stores it for the duration of the request, extracts
//! its text and writes the export artifact. Blocking: the web server calls
//! this from `spawn_blocking`, the CLI calls it directly.

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;

use crate::config::Settings;
use crate::export::{write_artifact, Artifact, ExportError, ExportFormat};
use crate::ocr::{ExtractionError, InputKind, OcrLanguage, TextExtractor};
use crate::storage::{split_upload_name, UploadedFile};

/// Everything that can go wrong converting an upload.
///
/// Client errors carry a message that is safe to show; internal errors are
/// logged in full and reported generically.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Unsupported file type: {0}")]
    UnsupportedExtension(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Upload exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Text files must be UTF-8 encoded")]
    InvalidEncoding,

    #[error("The file could not be read: {0}")]
    UnreadableFile(String),

    #[error("Could not detect any text. Ensure the image is clear.")]
    NoTextDetected,

    #[error("Extraction failed: {0}")]
    Extraction(ExtractionError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProcessError {
    /// Whether the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ProcessError::Extraction(_)
                | ProcessError::Export(_)
                | ProcessError::Storage(_)
                | ProcessError::Internal(_)
        )
    }
}

impl From<ExtractionError> for ProcessError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::InvalidEncoding => ProcessError::InvalidEncoding,
            ExtractionError::UnsupportedFileType(ext) => ProcessError::UnsupportedExtension(ext),
            ExtractionError::Image(e) => ProcessError::UnreadableFile(e.to_string()),
            ExtractionError::Docx(e) => ProcessError::UnreadableFile(e.to_string()),
            other => ProcessError::Extraction(other),
        }
    }
}

/// A file received from a client, not yet validated.
#[derive(Debug, Default, Clone)]
pub struct UploadRequest {
    /// Client-supplied filename; `None` when no file part was sent.
    pub filename: Option<String>,
    pub content: Vec<u8>,
    /// Raw `lang` field, if present.
    pub language: Option<String>,
    /// Raw `format` field, if present.
    pub format: Option<String>,
}

/// A finished conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub text: String,
    pub artifact: Artifact,
    pub language: OcrLanguage,
    pub format: ExportFormat,
}

impl Conversion {
    /// First `max_chars` characters of the extracted text.
    pub fn preview(&self, max_chars: usize) -> String {
        self.text.chars().take(max_chars).collect()
    }
}

/// Service converting uploads into export artifacts.
#[derive(Clone)]
pub struct ConversionService {
    settings: Arc<Settings>,
    extractor: TextExtractor,
}

impl ConversionService {
    pub fn new(settings: Arc<Settings>, extractor: TextExtractor) -> Self {
        let extractor = extractor.with_scan_options(settings.scan_options());
        Self {
            settings,
            extractor,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parse the optional `lang` field, falling back to the configured default.
    pub fn parse_language(&self, raw: Option<&str>) -> Result<OcrLanguage, ProcessError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(self.settings.default_language),
            Some(s) => OcrLanguage::from_str(s)
                .ok_or_else(|| ProcessError::UnsupportedLanguage(s.to_string())),
        }
    }

    /// Parse the optional `format` field, falling back to the configured default.
    pub fn parse_format(&self, raw: Option<&str>) -> Result<ExportFormat, ProcessError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(self.settings.default_format),
            Some(s) => ExportFormat::from_str(s)
                .ok_or_else(|| ProcessError::UnsupportedFormat(s.to_string())),
        }
    }

    /// Validate, store, extract and export one upload.
    ///
    /// The stored upload is removed before returning, on every path.
    pub fn convert_upload(&self, request: UploadRequest) -> Result<Conversion, ProcessError> {
        let raw_name = request.filename.ok_or(ProcessError::MissingFile)?;
        if raw_name.trim().is_empty() {
            return Err(ProcessError::EmptyFilename);
        }

        let language = self.parse_language(request.language.as_deref())?;
        let format = self.parse_format(request.format.as_deref())?;

        let (base, ext) = split_upload_name(&raw_name)
            .ok_or_else(|| ProcessError::UnsupportedExtension(raw_name.clone()))?;
        if !self.settings.is_allowed_extension(&ext) {
            return Err(ProcessError::UnsupportedExtension(ext));
        }
        let kind = InputKind::from_extension(&ext)
            .ok_or_else(|| ProcessError::UnsupportedExtension(ext.clone()))?;

        let upload =
            UploadedFile::persist(&self.settings.uploads_dir, &base, &ext, &request.content)?;
        tracing::info!(
            "Processing {} ({} bytes, lang={}, format={})",
            upload.original_name(),
            request.content.len(),
            language,
            format
        );

        let text = self.extractor.extract(upload.path(), kind, language)?;
        let conversion = self.finish(&base, text, language, format)?;

        if let Err(e) = upload.remove() {
            tracing::warn!("Failed to remove upload: {}", e);
        }
        Ok(conversion)
    }

    /// Convert a file already on disk (no upload storage involved).
    pub fn convert_file(
        &self,
        path: &Path,
        language: OcrLanguage,
        format: ExportFormat,
    ) -> Result<Conversion, ProcessError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let (base, ext) = split_upload_name(name)
            .ok_or_else(|| ProcessError::UnsupportedExtension(name.to_string()))?;
        let kind = InputKind::from_extension(&ext)
            .ok_or_else(|| ProcessError::UnsupportedExtension(ext.clone()))?;

        let text = self.extractor.extract(path, kind, language)?;
        self.finish(&base, text, language, format)
    }

    fn finish(
        &self,
        base: &str,
        text: String,
        language: OcrLanguage,
        format: ExportFormat,
    ) -> Result<Conversion, ProcessError> {
        if text.trim().is_empty() {
            return Err(ProcessError::NoTextDetected);
        }

        let timestamp = Local::now().naive_local();
        let artifact = write_artifact(&self.settings.outputs_dir, base, &timestamp, format, &text)?;

        Ok(Conversion {
            text,
            artifact,
            language,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{FakeOcr, FakePdf};
    use tempfile::{tempdir, TempDir};

    fn service(ocr_text: &str) -> (ConversionService, TempDir) {
        let dir = tempdir().unwrap();
        let settings = Settings::with_base_dir(dir.path());
        settings.ensure_directories().unwrap();

        let extractor = TextExtractor::new(
            Arc::new(FakeOcr(ocr_text.to_string())),
            Arc::new(FakePdf::new(&["short", "a page with plenty of embedded text"])),
        );
        (ConversionService::new(Arc::new(settings), extractor), dir)
    }

    fn upload(name: &str, content: &[u8], format: Option<&str>) -> UploadRequest {
        UploadRequest {
            filename: Some(name.to_string()),
            content: content.to_vec(),
            language: None,
            format: format.map(str::to_string),
        }
    }

    fn count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_text_upload_to_csv() {
        let (svc, _dir) = service("");
        let conversion = svc
            .convert_upload(upload("notes.txt", b"a\n\nb", Some("csv")))
            .unwrap();

        assert_eq!(conversion.format, ExportFormat::Csv);
        assert_eq!(conversion.language, OcrLanguage::EnglishHindi);
        let written = std::fs::read(&conversion.artifact.path).unwrap();
        assert_eq!(written, b"\xEF\xBB\xBFContent\na\nb\n");
        assert!(conversion.artifact.filename.starts_with("notes_"));
        assert!(conversion.artifact.filename.ends_with(".csv"));
        assert_eq!(count(&svc.settings().uploads_dir), 0);
    }

    #[test]
    fn test_pdf_upload_routes_pages() {
        let (svc, _dir) = service("from ocr");
        let conversion = svc
            .convert_upload(upload("report.pdf", b"%PDF-1.7", Some("md")))
            .unwrap();

        assert_eq!(
            conversion.text,
            "from ocr\na page with plenty of embedded text\n"
        );
        let md = std::fs::read_to_string(&conversion.artifact.path).unwrap();
        assert!(md.starts_with("# OCR Result\n\nfrom ocr\n"));
    }

    #[test]
    fn test_blank_extraction_creates_no_artifact() {
        let (svc, _dir) = service("   \n");
        let dir = tempdir().unwrap();
        let img = dir.path().join("blank.png");
        image::DynamicImage::ImageLuma8(image::GrayImage::new(4, 4))
            .save(&img)
            .unwrap();
        let bytes = std::fs::read(&img).unwrap();

        let err = svc
            .convert_upload(upload("blank.png", &bytes, None))
            .unwrap_err();

        assert!(matches!(err, ProcessError::NoTextDetected));
        assert!(err.is_client_error());
        assert_eq!(count(&svc.settings().outputs_dir), 0);
        assert_eq!(count(&svc.settings().uploads_dir), 0);
    }

    #[test]
    fn test_unknown_format_is_rejected_before_storage() {
        let (svc, _dir) = service("");
        let err = svc
            .convert_upload(upload("notes.txt", b"hello", Some("zzz")))
            .unwrap_err();

        assert!(matches!(err, ProcessError::UnsupportedFormat(ref f) if f == "zzz"));
        assert_eq!(count(&svc.settings().outputs_dir), 0);
        assert_eq!(count(&svc.settings().uploads_dir), 0);
    }

    #[test]
    fn test_extension_validation() {
        let (svc, _dir) = service("");
        for name in ["README", "malware.exe", "archive.tar.gz", "trailing."] {
            let err = svc.convert_upload(upload(name, b"x", None)).unwrap_err();
            assert!(
                matches!(err, ProcessError::UnsupportedExtension(_)),
                "{name}: {err:?}"
            );
        }
        assert_eq!(count(&svc.settings().uploads_dir), 0);
    }

    #[test]
    fn test_missing_and_empty_filename() {
        let (svc, _dir) = service("");
        let missing = UploadRequest::default();
        assert!(matches!(
            svc.convert_upload(missing),
            Err(ProcessError::MissingFile)
        ));
        assert!(matches!(
            svc.convert_upload(upload("", b"x", None)),
            Err(ProcessError::EmptyFilename)
        ));
    }

    #[test]
    fn test_failures_still_remove_upload() {
        let (svc, _dir) = service("");
        let err = svc
            .convert_upload(upload("latin1.txt", &[0xe9, 0x74, 0xe9], None))
            .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidEncoding));

        let err = svc
            .convert_upload(upload("broken.docx", b"not a zip", None))
            .unwrap_err();
        assert!(matches!(err, ProcessError::UnreadableFile(_)));

        assert_eq!(count(&svc.settings().uploads_dir), 0);
    }

    #[test]
    fn test_language_parsing() {
        let (svc, _dir) = service("");
        assert_eq!(svc.parse_language(None).unwrap(), OcrLanguage::EnglishHindi);
        assert_eq!(svc.parse_language(Some("")).unwrap(), OcrLanguage::EnglishHindi);
        assert_eq!(svc.parse_language(Some("hin")).unwrap(), OcrLanguage::Hindi);
        assert!(matches!(
            svc.parse_language(Some("klingon")),
            Err(ProcessError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_preview_counts_characters() {
        let (svc, _dir) = service("");
        let text = "ह".repeat(2000);
        let conversion = svc
            .convert_upload(upload("hindi.txt", text.as_bytes(), None))
            .unwrap();
        assert_eq!(conversion.preview(1500).chars().count(), 1500);
        assert_eq!(conversion.preview(5000), text);
    }

    #[test]
    fn test_convert_file() {
        let (svc, dir) = service("");
        let path = dir.path().join("local.txt");
        std::fs::write(&path, "local text").unwrap();

        let conversion = svc
            .convert_file(&path, OcrLanguage::English, ExportFormat::Docx)
            .unwrap();
        assert!(conversion.artifact.filename.starts_with("local_"));
        assert!(conversion.artifact.path.exists());
    }
}
