//! One-shot extraction without the web server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::ocr::TextExtractor;
use crate::services::ConversionService;

/// Extract text from `file` and write an artifact next to the other outputs.
pub async fn cmd_extract(
    mut settings: Settings,
    file: &Path,
    lang: Option<&str>,
    format: Option<&str>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("File not found: {}", file.display());
    }
    if let Some(dir) = output_dir {
        settings.outputs_dir = dir;
    }
    std::fs::create_dir_all(&settings.outputs_dir)?;

    let service = ConversionService::new(Arc::new(settings), TextExtractor::default());
    let language = service.parse_language(lang)?;
    let format = service.parse_format(format)?;

    eprintln!(
        "{} Extracting {} ({}, {})",
        style("→").cyan(),
        file.display(),
        language.display_name(),
        format.display_name()
    );

    let path = file.to_path_buf();
    let conversion =
        tokio::task::spawn_blocking(move || service.convert_file(&path, language, format))
            .await??;

    eprintln!(
        "{} Extracted {} characters",
        style("✓").green(),
        conversion.text.chars().count()
    );
    println!("{}", conversion.artifact.path.display());

    Ok(())
}
