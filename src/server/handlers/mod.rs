//! HTTP request handlers for the web server.

mod download;
mod pages;
mod process;

// Re-export handlers for use by the router
pub use download::download_artifact;
pub use pages::{health, index};
pub use process::{process_upload, ProcessResponse};
