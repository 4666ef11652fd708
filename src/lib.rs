pub mod api;
pub mod core;
pub mod generators;
pub mod models;
pub mod pdf;
pub mod storage;
pub mod templates;

// Re-export commonly used types
pub use crate::core::{RenderError, ServiceConfig, StorageBackend};
pub use models::{RenderPayload, RenderRequest, RenderResponse};

pub use generators::{DocumentConverter, GotenbergConverter};
pub use pdf::PdfValidator;
pub use storage::{ObjectStore, StoragePublisher};
pub use templates::{rewrite_archive, TemplateSource};
