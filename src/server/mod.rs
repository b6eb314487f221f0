//! Web server for uploading files and downloading their extracted text.
//!
//! - `GET /` upload page
//! - `POST /process` multipart upload, JSON result
//! - `GET /download/:filename` artifact download
//! - `GET /health` liveness probe

mod error;
mod handlers;
mod routes;
mod template_structs;

pub use error::ErrorResponse;
pub use handlers::ProcessResponse;
pub use routes::create_router;

use std::sync::Arc;

use crate::config::Settings;
use crate::ocr::TextExtractor;
use crate::services::ConversionService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub service: ConversionService,
}

impl AppState {
    pub fn new(settings: Settings, extractor: TextExtractor) -> Self {
        let settings = Arc::new(settings);
        Self {
            service: ConversionService::new(settings.clone(), extractor),
            settings,
        }
    }
}

/// Start the web server.
pub async fn serve(settings: Settings, host: &str, port: u16) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let state = AppState::new(settings, TextExtractor::default());
    let app = create_router(state);

    let listener = bind_listener(host, port).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind to `host:port`, where `host` may be an IP address or a hostname.
async fn bind_listener(host: &str, port: u16) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((host, port)).await
}
