//! Export of extracted text to downloadable artifacts.
//!
//! Artifacts are named `{base}_{YYYYmmdd_HHMMSS}.{ext}`. When that name is
//! already taken (the same file uploaded twice within one second) a `-1`,
//! `-2`, ... suffix is added to the stem; files are created with
//! create-new semantics so two requests never share an artifact.

mod docx;
mod text;

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

/// Give up on finding a free artifact name after this many attempts.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Timestamp layout embedded in artifact filenames.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Errors that can occur while writing an artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No free artifact name for {0}")]
    NameExhausted(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    #[default]
    Txt,
    Md,
    Docx,
    Csv,
}

impl ExportFormat {
    /// Format tag, also used as the file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
            ExportFormat::Docx => "docx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "txt" => Some(ExportFormat::Txt),
            "md" => Some(ExportFormat::Md),
            "docx" => Some(ExportFormat::Docx),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }

    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Txt,
            ExportFormat::Md,
            ExportFormat::Docx,
            ExportFormat::Csv,
        ]
    }

    /// Label for the upload form.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "Plain text (.txt)",
            ExportFormat::Md => "Markdown (.md)",
            ExportFormat::Docx => "Word document (.docx)",
            ExportFormat::Csv => "Spreadsheet (.csv)",
        }
    }

    /// Write `text` in this format.
    fn write_to(&self, file: File, text: &str) -> Result<(), ExportError> {
        match self {
            ExportFormat::Txt => buffered(file, |out| text::write_txt(out, text))?,
            ExportFormat::Md => buffered(file, |out| text::write_markdown(out, text))?,
            ExportFormat::Csv => buffered(file, |out| text::write_csv(out, text))?,
            ExportFormat::Docx => docx::write_docx(file, text)?,
        }
        Ok(())
    }
}

fn buffered<F>(file: File, write: F) -> std::io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut out = BufWriter::new(file);
    write(&mut out)?;
    out.flush()
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A written output file.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// File name inside the outputs directory.
    pub filename: String,
    /// Full path on disk.
    pub path: PathBuf,
}

/// Build the artifact filename for a given attempt (0 = no suffix).
pub fn artifact_filename(
    base: &str,
    timestamp: &NaiveDateTime,
    format: ExportFormat,
    attempt: u32,
) -> String {
    let stamp = timestamp.format(TIMESTAMP_FORMAT);
    if attempt == 0 {
        format!("{}_{}.{}", base, stamp, format.as_str())
    } else {
        format!("{}_{}-{}.{}", base, stamp, attempt, format.as_str())
    }
}

/// Write `text` to a fresh artifact in `outputs_dir`.
///
/// On a write failure the partially written file is removed.
pub fn write_artifact(
    outputs_dir: &Path,
    base: &str,
    timestamp: &NaiveDateTime,
    format: ExportFormat,
    text: &str,
) -> Result<Artifact, ExportError> {
    let (filename, path, file) = create_unique(outputs_dir, base, timestamp, format)?;

    if let Err(e) = format.write_to(file, text) {
        if let Err(rm) = std::fs::remove_file(&path) {
            tracing::warn!("Failed to remove partial artifact {}: {}", path.display(), rm);
        }
        return Err(e);
    }

    tracing::info!("Wrote {} artifact {}", format, filename);
    Ok(Artifact { filename, path })
}

fn create_unique(
    outputs_dir: &Path,
    base: &str,
    timestamp: &NaiveDateTime,
    format: ExportFormat,
) -> Result<(String, PathBuf, File), ExportError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let filename = artifact_filename(base, timestamp, format, attempt);
        let path = outputs_dir.join(&filename);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((filename, path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(ExportError::NameExhausted(artifact_filename(
        base, timestamp, format, 0,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_format_tags() {
        for format in ExportFormat::all() {
            assert_eq!(ExportFormat::from_str(format.as_str()), Some(*format));
        }
        assert_eq!(ExportFormat::from_str("zzz"), None);
        assert_eq!(ExportFormat::from_str(""), None);
        assert_eq!(ExportFormat::default(), ExportFormat::Txt);
    }

    #[test]
    fn test_artifact_filename() {
        assert_eq!(
            artifact_filename("scan", &ts(), ExportFormat::Csv, 0),
            "scan_20240309_140507.csv"
        );
        assert_eq!(
            artifact_filename("scan", &ts(), ExportFormat::Md, 2),
            "scan_20240309_140507-2.md"
        );
    }

    #[test]
    fn test_same_second_uploads_do_not_collide() {
        let dir = tempdir().unwrap();

        let first = write_artifact(dir.path(), "scan", &ts(), ExportFormat::Txt, "one").unwrap();
        let second = write_artifact(dir.path(), "scan", &ts(), ExportFormat::Txt, "two").unwrap();

        assert_eq!(first.filename, "scan_20240309_140507.txt");
        assert_eq!(second.filename, "scan_20240309_140507-1.txt");
        assert_eq!(std::fs::read_to_string(&first.path).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(&second.path).unwrap(), "two");
    }

    #[test]
    fn test_every_format_writes_a_file() {
        let dir = tempdir().unwrap();
        for format in ExportFormat::all() {
            let artifact =
                write_artifact(dir.path(), "doc", &ts(), *format, "hello\nworld").unwrap();
            assert!(artifact.path.exists());
            assert!(artifact.filename.ends_with(format.as_str()));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_missing_outputs_dir_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_artifact(&missing, "doc", &ts(), ExportFormat::Txt, "x").unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
