//! Service layer for docscan business logic.
//!
//! Services can be used by the CLI, the web server, or other interfaces.

pub mod conversion;

pub use conversion::{Conversion, ConversionService, ProcessError, UploadRequest};
