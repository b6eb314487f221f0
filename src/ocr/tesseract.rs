//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use image::DynamicImage;
use tempfile::TempDir;

use super::backend::{check_binary, spawn_error, OcrBackend, OcrError, OcrResult};
use super::language::OcrLanguage;

/// Fully automatic page segmentation, no orientation detection.
const PAGE_SEGMENTATION_MODE: &str = "3";
/// Default engine, based on what is available.
const ENGINE_MODE: &str = "3";

/// Tesseract OCR backend.
#[derive(Debug, Default, Clone)]
pub struct TesseractBackend;

impl TesseractBackend {
    pub fn new() -> Self {
        Self
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path, language: OcrLanguage) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", language.as_str()])
            .args(["--oem", ENGINE_MODE, "--psm", PAGE_SEGMENTATION_MODE])
            .output()
            .map_err(|e| spawn_error(e, "tesseract not found (install tesseract-ocr)"))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr.trim())))
        }
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Tesseract is available".to_string()
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr tesseract-ocr-hin"
                .to_string()
        }
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        language: OcrLanguage,
    ) -> Result<OcrResult, OcrError> {
        let start = Instant::now();

        let temp_dir = TempDir::new()?;
        let image_path = temp_dir.path().join("input.png");
        image.save(&image_path)?;

        let text = self.run_tesseract(&image_path, language)?;
        let elapsed = start.elapsed();

        tracing::debug!(
            "tesseract ({}) recognized {} chars in {}ms",
            language,
            text.len(),
            elapsed.as_millis()
        );

        Ok(OcrResult {
            text,
            backend: self.name(),
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}
