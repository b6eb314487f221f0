//! External tool availability check.

use console::style;

use crate::ocr::{OcrBackend, TesseractBackend, TextExtractor};

/// Report which external tools are on PATH; fails if any is missing.
pub fn cmd_check() -> anyhow::Result<()> {
    let tools = TextExtractor::check_tools();

    println!("{}", style("External tools").bold());
    for (tool, available) in &tools {
        if *available {
            println!("  {} {}", style("✓").green(), tool);
        } else {
            println!("  {} {} {}", style("✗").red(), tool, style("(not found)").dim());
        }
    }

    let tesseract = TesseractBackend::new();
    if !tesseract.is_available() {
        println!();
        println!("  {}", tesseract.availability_hint());
    }

    let missing = tools.iter().filter(|(_, ok)| !ok).count();
    if missing > 0 {
        anyhow::bail!("{} required tool(s) missing", missing);
    }

    println!("{} All tools available", style("✓").green());
    Ok(())
}
