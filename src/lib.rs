//! docscan: text extraction for uploaded PDFs, images, Word documents and
//! plain-text files.
//!
//! OCR and PDF handling are delegated to external tools (Tesseract and
//! Poppler). The extracted text is exported as txt, md, docx or csv.

pub mod cli;
pub mod config;
pub mod export;
pub mod ocr;
pub mod server;
pub mod services;
pub mod storage;
