//! Language selection for OCR.

use std::fmt;

/// Languages the OCR engine is asked to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OcrLanguage {
    /// English only.
    English,
    /// Hindi (Devanagari) only.
    Hindi,
    /// English and Hindi in the same document.
    #[default]
    EnglishHindi,
}

impl OcrLanguage {
    /// Tesseract language code passed via `-l`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrLanguage::English => "eng",
            OcrLanguage::Hindi => "hin",
            OcrLanguage::EnglishHindi => "eng+hin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "eng" => Some(OcrLanguage::English),
            "hin" => Some(OcrLanguage::Hindi),
            "eng+hin" | "hin+eng" => Some(OcrLanguage::EnglishHindi),
            _ => None,
        }
    }

    pub fn all() -> &'static [OcrLanguage] {
        &[
            OcrLanguage::EnglishHindi,
            OcrLanguage::Hindi,
            OcrLanguage::English,
        ]
    }

    /// Label for the upload form.
    pub fn display_name(&self) -> &'static str {
        match self {
            OcrLanguage::English => "English",
            OcrLanguage::Hindi => "Hindi",
            OcrLanguage::EnglishHindi => "English + Hindi",
        }
    }
}

impl fmt::Display for OcrLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
