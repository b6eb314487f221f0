//! PDF scanning with per-page routing between digital text and OCR.
//!
//! Each page is tried for embedded text first. Pages that carry too little
//! of it (scans, photos, handwriting) are rasterized and sent through the
//! preprocessor and the OCR backend instead.

use std::path::Path;
use std::process::Command;

use image::DynamicImage;
use tempfile::TempDir;
use thiserror::Error;

use super::backend::{OcrBackend, OcrError};
use super::language::OcrLanguage;
use super::preprocess::preprocess_image;

/// Trimmed character count a page's embedded text must exceed to skip OCR.
pub const DEFAULT_DIGITAL_TEXT_MIN_CHARS: usize = 20;

/// Rasterization resolution for OCR'd pages.
pub const DEFAULT_RENDER_DPI: u32 = 200;

/// Errors that can occur while scanning a PDF.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed: {message}")]
    CommandFailed { tool: &'static str, message: String },

    #[error("Could not determine page count")]
    UnknownPageCount,

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Access to a PDF's pages.
pub trait PdfSource: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, pdf_path: &Path) -> Result<u32, ScanError>;

    /// Embedded text of a single 1-based page. May be empty.
    fn page_text(&self, pdf_path: &Path, page: u32) -> Result<String, ScanError>;

    /// Rasterize a single 1-based page.
    fn render_page(&self, pdf_path: &Path, page: u32, dpi: u32)
        -> Result<DynamicImage, ScanError>;
}

/// [`PdfSource`] backed by the Poppler command-line tools.
#[derive(Debug, Default, Clone)]
pub struct PopplerPdf;

impl PopplerPdf {
    pub fn new() -> Self {
        Self
    }

    fn run(tool: &'static str, cmd: &mut Command) -> Result<Vec<u8>, ScanError> {
        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScanError::ToolNotFound(format!("{} (install poppler-utils)", tool))
            } else {
                ScanError::Io(e)
            }
        })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(ScanError::CommandFailed {
                tool,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl PdfSource for PopplerPdf {
    fn page_count(&self, pdf_path: &Path) -> Result<u32, ScanError> {
        let stdout = Self::run("pdfinfo", Command::new("pdfinfo").arg(pdf_path))?;
        parse_page_count(&String::from_utf8_lossy(&stdout)).ok_or(ScanError::UnknownPageCount)
    }

    fn page_text(&self, pdf_path: &Path, page: u32) -> Result<String, ScanError> {
        let page_str = page.to_string();
        let stdout = Self::run(
            "pdftotext",
            Command::new("pdftotext")
                .args(["-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
                .arg(pdf_path)
                .arg("-"),
        )?;

        // pdftotext terminates every page with a form feed
        Ok(String::from_utf8_lossy(&stdout)
            .trim_end_matches('\u{c}')
            .to_string())
    }

    fn render_page(
        &self,
        pdf_path: &Path,
        page: u32,
        dpi: u32,
    ) -> Result<DynamicImage, ScanError> {
        let temp_dir = TempDir::new()?;
        let output_prefix = temp_dir.path().join("page");
        let page_str = page.to_string();
        let dpi_str = dpi.to_string();

        Self::run(
            "pdftoppm",
            Command::new("pdftoppm")
                .args(["-png", "-singlefile", "-r", &dpi_str])
                .args(["-f", &page_str, "-l", &page_str])
                .arg(pdf_path)
                .arg(&output_prefix),
        )?;

        Ok(image::open(temp_dir.path().join("page.png"))?)
    }
}

/// Parse the `Pages:` line of `pdfinfo` output.
fn parse_page_count(pdfinfo: &str) -> Option<u32> {
    pdfinfo
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
}

/// How a page's text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMethod {
    /// Embedded text was long enough to use as-is.
    Digital,
    /// Page was rasterized and OCR'd.
    Ocr,
}

/// Result of scanning a PDF.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Newline-joined text of all pages.
    pub text: String,
    /// Routing decision per page, in page order.
    pub pages: Vec<PageMethod>,
}

impl ScanReport {
    pub fn ocr_page_count(&self) -> usize {
        self.pages.iter().filter(|m| **m == PageMethod::Ocr).count()
    }
}

/// Tuning knobs for [`DocumentScanner`].
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub digital_text_min_chars: usize,
    pub render_dpi: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            digital_text_min_chars: DEFAULT_DIGITAL_TEXT_MIN_CHARS,
            render_dpi: DEFAULT_RENDER_DPI,
        }
    }
}

/// Walks a PDF page by page, choosing digital text or OCR for each.
pub struct DocumentScanner<'a> {
    pdf: &'a dyn PdfSource,
    ocr: &'a dyn OcrBackend,
    options: ScanOptions,
}

impl<'a> DocumentScanner<'a> {
    pub fn new(pdf: &'a dyn PdfSource, ocr: &'a dyn OcrBackend, options: ScanOptions) -> Self {
        Self { pdf, ocr, options }
    }

    /// Whether embedded page text is substantial enough to skip OCR.
    pub fn is_digital(&self, content: &str) -> bool {
        content.trim().chars().count() > self.options.digital_text_min_chars
    }

    /// Scan every page. The first failure aborts the whole document.
    pub fn scan(&self, pdf_path: &Path, language: OcrLanguage) -> Result<ScanReport, ScanError> {
        let page_count = self.pdf.page_count(pdf_path)?;
        let mut text = String::new();
        let mut pages = Vec::with_capacity(page_count as usize);

        for page in 1..=page_count {
            let content = self.pdf.page_text(pdf_path, page)?;

            if self.is_digital(&content) {
                text.push_str(&content);
                text.push('\n');
                pages.push(PageMethod::Digital);
                continue;
            }

            tracing::debug!(
                "Page {} of {} has too little embedded text, running OCR",
                page,
                pdf_path.display()
            );
            let image = self
                .pdf
                .render_page(pdf_path, page, self.options.render_dpi)?;
            let result = self.ocr.recognize(&preprocess_image(&image), language)?;
            text.push_str(&result.text);
            text.push('\n');
            pages.push(PageMethod::Ocr);
        }

        let report = ScanReport { text, pages };
        tracing::info!(
            "Scanned {} ({} pages, {} via OCR)",
            pdf_path.display(),
            page_count,
            report.ocr_page_count()
        );
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ocr::OcrResult;
    use image::{GenericImageView, GrayImage, Luma};
    use std::sync::Mutex;

    /// In-memory PDF: one embedded-text string per page.
    pub(crate) struct FakePdf {
        pub pages: Vec<String>,
        pub fail_on_page: Option<u32>,
        pub rendered: Mutex<Vec<u32>>,
    }

    impl FakePdf {
        pub fn new(pages: &[&str]) -> Self {
            Self {
                pages: pages.iter().map(|s| s.to_string()).collect(),
                fail_on_page: None,
                rendered: Mutex::new(Vec::new()),
            }
        }
    }

    impl PdfSource for FakePdf {
        fn page_count(&self, _pdf_path: &Path) -> Result<u32, ScanError> {
            Ok(self.pages.len() as u32)
        }

        fn page_text(&self, _pdf_path: &Path, page: u32) -> Result<String, ScanError> {
            if self.fail_on_page == Some(page) {
                return Err(ScanError::CommandFailed {
                    tool: "pdftotext",
                    message: "damaged page".to_string(),
                });
            }
            Ok(self.pages[page as usize - 1].clone())
        }

        fn render_page(
            &self,
            _pdf_path: &Path,
            page: u32,
            _dpi: u32,
        ) -> Result<DynamicImage, ScanError> {
            self.rendered.lock().unwrap().push(page);
            Ok(DynamicImage::ImageLuma8(GrayImage::from_pixel(
                10,
                10,
                Luma([page as u8]),
            )))
        }
    }

    /// OCR backend that returns a fixed string and checks it got a grayscale image.
    pub(crate) struct FakeOcr(pub String);

    impl OcrBackend for FakeOcr {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            String::new()
        }

        fn recognize(
            &self,
            image: &DynamicImage,
            _language: OcrLanguage,
        ) -> Result<OcrResult, OcrError> {
            assert_eq!(image.color(), image::ColorType::L8);
            assert!(image.dimensions().0 > 0);
            Ok(OcrResult {
                text: self.0.clone(),
                backend: "fake",
                processing_time_ms: 0,
            })
        }
    }

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          report\nProducer:       pdfTeX\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
        assert_eq!(parse_page_count("Title: x\n"), None);
    }

    #[test]
    fn test_digital_threshold_is_exclusive() {
        let pdf = FakePdf::new(&[]);
        let ocr = FakeOcr(String::new());
        let scanner = DocumentScanner::new(&pdf, &ocr, ScanOptions::default());

        assert!(!scanner.is_digital("  exactly twenty chars  ".trim()));
        assert!(!scanner.is_digital(&format!("   {}   ", "x".repeat(20))));
        assert!(scanner.is_digital(&"x".repeat(21)));
        // characters, not bytes
        assert!(!scanner.is_digital(&"ह".repeat(20)));
    }

    #[test]
    fn test_sparse_pages_are_routed_to_ocr() {
        let long = "This page has plenty of embedded digital text.";
        let pdf = FakePdf::new(&[long, "   short   ", "", long]);
        let ocr = FakeOcr("handwritten".to_string());
        let scanner = DocumentScanner::new(&pdf, &ocr, ScanOptions::default());

        let report = scanner
            .scan(Path::new("doc.pdf"), OcrLanguage::English)
            .unwrap();

        assert_eq!(
            report.pages,
            vec![
                PageMethod::Digital,
                PageMethod::Ocr,
                PageMethod::Ocr,
                PageMethod::Digital
            ]
        );
        assert_eq!(*pdf.rendered.lock().unwrap(), vec![2, 3]);
        assert_eq!(
            report.text,
            format!("{long}\nhandwritten\nhandwritten\n{long}\n")
        );
        assert_eq!(report.ocr_page_count(), 2);
    }

    #[test]
    fn test_page_failure_discards_everything() {
        let mut pdf = FakePdf::new(&["a page with enough digital text on it", "x"]);
        pdf.fail_on_page = Some(2);
        let ocr = FakeOcr(String::new());
        let scanner = DocumentScanner::new(&pdf, &ocr, ScanOptions::default());

        let err = scanner
            .scan(Path::new("doc.pdf"), OcrLanguage::English)
            .unwrap_err();
        assert!(matches!(err, ScanError::CommandFailed { .. }));
    }

    #[test]
    fn test_custom_threshold() {
        let pdf = FakePdf::new(&["tiny"]);
        let ocr = FakeOcr("ocr".to_string());
        let scanner = DocumentScanner::new(
            &pdf,
            &ocr,
            ScanOptions {
                digital_text_min_chars: 2,
                render_dpi: 72,
            },
        );

        let report = scanner
            .scan(Path::new("doc.pdf"), OcrLanguage::Hindi)
            .unwrap();
        assert_eq!(report.pages, vec![PageMethod::Digital]);
        assert_eq!(report.text, "tiny\n");
    }
}
