//! Storage helpers for uploads and output artifacts on disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use unicode_normalization::UnicodeNormalization;

/// Make an uploaded filename safe to use on the local filesystem.
///
/// Accented letters are decomposed (NFKD) so `é` keeps its `e`. Keeps ASCII
/// letters, digits, `_`, `.` and `-`; path separators and runs of
/// whitespace become `_`; everything else is dropped. Leading and trailing
/// dots and underscores are stripped, so `../../etc/passwd` becomes
/// `etc_passwd`. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .nfkd()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Split an uploaded filename into a sanitized `(base, lowercase extension)`.
///
/// The two halves are sanitized separately so a name made entirely of
/// non-ASCII characters still keeps its extension; such a base becomes
/// `upload`. Returns `None` when there is no usable extension.
pub fn split_upload_name(raw: &str) -> Option<(String, String)> {
    let (raw_base, raw_ext) = raw.rsplit_once('.')?;
    let ext = secure_filename(raw_ext).to_lowercase();
    if ext.is_empty() {
        return None;
    }

    let base = secure_filename(raw_base);
    let base = if base.is_empty() {
        "upload".to_string()
    } else {
        base
    };
    Some((base, ext))
}

/// An uploaded file persisted in the uploads directory for one request.
///
/// The file is removed when the value is dropped, whichever way the request
/// ends.
pub struct UploadedFile {
    file: NamedTempFile,
    original_name: String,
}

impl UploadedFile {
    /// Persist `content` as `{base}-XXXXXX.{ext}` inside `uploads_dir`.
    pub fn persist(
        uploads_dir: &Path,
        base: &str,
        extension: &str,
        content: &[u8],
    ) -> std::io::Result<Self> {
        let prefix = format!("{}-", base);
        let suffix = format!(".{}", extension);
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(uploads_dir)?;

        file.write_all(content)?;
        file.flush()?;

        tracing::debug!(
            "Stored upload {} ({} bytes)",
            file.path().display(),
            content.len()
        );

        Ok(Self {
            file,
            original_name: format!("{}.{}", base, extension),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Sanitized name the client uploaded the file as.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Remove the file now, reporting failures.
    pub fn remove(self) -> std::io::Result<()> {
        self.file.close()
    }
}

/// Resolve a requested artifact name to a path inside `outputs_dir`.
///
/// Rejects anything that is not a plain file name or that escapes the
/// directory through symlinks. Returns `None` when the file does not exist.
pub fn resolve_artifact(outputs_dir: &Path, filename: &str) -> Option<PathBuf> {
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return None;
    }

    let canonical_dir = outputs_dir.canonicalize().ok()?;
    let canonical_file = canonical_dir.join(filename).canonicalize().ok()?;

    if canonical_file.starts_with(&canonical_dir) && canonical_file.is_file() {
        Some(canonical_file)
    } else {
        None
    }
}
