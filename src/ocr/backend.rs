//! OCR backend abstraction.
//!
//! The request handler and the document scanner only talk to [`OcrBackend`],
//! so the engine can be swapped (or faked in tests) without touching the
//! extraction pipeline.

use image::DynamicImage;
use thiserror::Error;

use super::language::OcrLanguage;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text. Empty when no glyphs were detected.
    pub text: String,
    /// Which backend produced this result.
    pub backend: &'static str,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Check if this backend is available (dependencies installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Recognize text in an already-decoded image.
    ///
    /// An image without detectable text yields an empty string, not an error.
    fn recognize(
        &self,
        image: &DynamicImage,
        language: OcrLanguage,
    ) -> Result<OcrResult, OcrError>;
}

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Map a failed command spawn to the right error.
pub(crate) fn spawn_error(err: std::io::Error, hint: &str) -> OcrError {
    if err.kind() == std::io::ErrorKind::NotFound {
        OcrError::BackendNotAvailable(hint.to_string())
    } else {
        OcrError::Io(err)
    }
}
