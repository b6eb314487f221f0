//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod extract;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "docscan")]
#[command(about = "Extract text from PDFs, images and documents with OCR")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind: port, host, or host:port (defaults to config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Extract text from a local file and write it in the chosen format
    Extract {
        /// Input file (pdf, png, jpg, jpeg, docx, txt)
        file: PathBuf,
        /// OCR language: eng, hin or eng+hin
        #[arg(short, long)]
        lang: Option<String>,
        /// Output format: txt, md, docx or csv
        #[arg(short, long)]
        format: Option<String>,
        /// Directory to write the result into (defaults to the outputs directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Check that the external OCR and PDF tools are installed
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let settings = load_settings(options).await;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(settings, &bind).await
        }
        Commands::Extract {
            file,
            lang,
            format,
            output_dir,
        } => {
            extract::cmd_extract(
                settings,
                &file,
                lang.as_deref(),
                format.as_deref(),
                output_dir,
            )
            .await
        }
        Commands::Check => check::cmd_check(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "docscan",
            "extract",
            "scan.pdf",
            "--lang",
            "hin",
            "-f",
            "csv",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Extract {
                file, lang, format, ..
            } => {
                assert_eq!(file, PathBuf::from("scan.pdf"));
                assert_eq!(lang.as_deref(), Some("hin"));
                assert_eq!(format.as_deref(), Some("csv"));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_extract_requires_file() {
        assert!(Cli::try_parse_from(["docscan", "extract"]).is_err());
    }
}
