//! Configuration management for docscan.
//!
//! Settings are resolved once at startup and handed to the server and CLI
//! explicitly; nothing reads process-wide state after that. Precedence, low
//! to high: built-in defaults, config file, environment, command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;
use crate::ocr::{OcrLanguage, ScanOptions, DEFAULT_DIGITAL_TEXT_MIN_CHARS, DEFAULT_RENDER_DPI};

/// Maximum accepted upload size (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Characters of extracted text returned as a preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 1500;

/// Default bind address for `serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Upload extensions accepted by default.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "docx", "txt"];

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where uploads live while a request is processed.
    pub uploads_dir: PathBuf,
    /// Where output artifacts are written and served from.
    pub outputs_dir: PathBuf,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
    /// Lowercase extensions accepted for upload.
    pub allowed_extensions: Vec<String>,
    /// Trimmed character count a PDF page's digital text must exceed to skip OCR.
    pub digital_text_min_chars: usize,
    /// Rasterization DPI for OCR'd PDF pages.
    pub render_dpi: u32,
    /// Preview length in characters.
    pub preview_chars: usize,
    /// Language used when a request does not specify one.
    pub default_language: OcrLanguage,
    /// Export format used when a request does not specify one.
    pub default_format: ExportFormat,
    /// Address for the web server.
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("uploads"),
            outputs_dir: PathBuf::from("outputs"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            digital_text_min_chars: DEFAULT_DIGITAL_TEXT_MIN_CHARS,
            render_dpi: DEFAULT_RENDER_DPI,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            default_language: OcrLanguage::default(),
            default_format: ExportFormat::default(),
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// Create settings rooted in a single directory (`uploads/` and `outputs/` below it).
    pub fn with_base_dir(base_dir: &Path) -> Self {
        Self {
            uploads_dir: base_dir.join("uploads"),
            outputs_dir: base_dir.join("outputs"),
            ..Default::default()
        }
    }

    /// Check whether an extension (any case) is accepted for upload.
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            digital_text_min_chars: self.digital_text_min_chars,
            render_dpi: self.render_dpi,
        }
    }

    /// Ensure the uploads and outputs directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [&self.uploads_dir, &self.outputs_dir] {
            std::fs::create_dir_all(dir)?;
            tracing::debug!("Using directory {}", dir.display());
        }
        Ok(())
    }
}

/// On-disk configuration file. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub uploads_dir: Option<String>,
    pub outputs_dir: Option<String>,
    pub max_upload_mb: Option<usize>,
    pub allowed_extensions: Option<Vec<String>>,
    pub digital_text_min_chars: Option<usize>,
    pub render_dpi: Option<u32>,
    pub preview_chars: Option<usize>,
    pub default_language: Option<String>,
    pub default_format: Option<String>,
    pub bind: Option<String>,

    /// Path the config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Automatically discovers docscan config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("docscan").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref dir) = self.uploads_dir {
            settings.uploads_dir = self.resolve_path(dir, base_dir);
        }
        if let Some(ref dir) = self.outputs_dir {
            settings.outputs_dir = self.resolve_path(dir, base_dir);
        }
        if let Some(mb) = self.max_upload_mb {
            settings.max_upload_bytes = mb * 1024 * 1024;
        }
        if let Some(ref exts) = self.allowed_extensions {
            settings.allowed_extensions = exts
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect();
        }
        if let Some(min_chars) = self.digital_text_min_chars {
            settings.digital_text_min_chars = min_chars;
        }
        if let Some(dpi) = self.render_dpi {
            settings.render_dpi = dpi;
        }
        if let Some(chars) = self.preview_chars {
            settings.preview_chars = chars;
        }
        if let Some(ref lang) = self.default_language {
            match OcrLanguage::from_str(lang) {
                Some(lang) => settings.default_language = lang,
                None => tracing::warn!("Ignoring unknown default_language '{}'", lang),
            }
        }
        if let Some(ref format) = self.default_format {
            match ExportFormat::from_str(format) {
                Some(format) => settings.default_format = format,
                None => tracing::warn!("Ignoring unknown default_format '{}'", format),
            }
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides discovery).
    pub config_path: Option<PathBuf>,
    /// Resolve relative paths from the current directory instead of the config file location.
    pub use_cwd: bool,
}

/// Load settings: defaults, then config file, then environment.
pub async fn load_settings(options: LoadOptions) -> Settings {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd
    } else {
        config.base_dir().unwrap_or(cwd)
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings);
    settings
}

/// Environment variables take precedence over the config file.
fn apply_env_overrides(settings: &mut Settings) {
    if let Some(dir) = env_var("DOCSCAN_UPLOADS_DIR") {
        tracing::debug!("Using DOCSCAN_UPLOADS_DIR from environment: {}", dir);
        settings.uploads_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
    }
    if let Some(dir) = env_var("DOCSCAN_OUTPUTS_DIR") {
        tracing::debug!("Using DOCSCAN_OUTPUTS_DIR from environment: {}", dir);
        settings.outputs_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
    }
    if let Some(bind) = env_var("DOCSCAN_BIND") {
        settings.bind = bind;
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
