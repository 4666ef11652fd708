use thiserror::Error;

/// Every way a render request can fail.
///
/// The payload strings are internal detail for logs; callers only ever see
/// [`RenderError::code`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("missing or mismatched api key")]
    Unauthorized,

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("template fetch failed: {0}")]
    SourceFetchFailed(String),

    #[error("unrecognized template format: {0}")]
    UnrecognizedFormat(String),

    #[error("conversion service answered {0}")]
    ConversionFailed(String),

    #[error("conversion service unreachable: {0}")]
    ConversionUnreachable(String),

    #[error("pdf too small: {actual} bytes, minimum is {minimum}")]
    PdfTooSmall { actual: usize, minimum: usize },

    #[error("conversion output does not start with a pdf signature")]
    NotPdf,

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("server error: {0}")]
    ServerError(String),
}

impl RenderError {
    /// Stable machine-readable code returned in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::Unauthorized => "unauthorized",
            RenderError::BadRequest(_) => "bad_request",
            RenderError::SourceFetchFailed(_) => "source_fetch_failed",
            RenderError::UnrecognizedFormat(_) => "unknown_template_format",
            RenderError::ConversionFailed(_) | RenderError::ConversionUnreachable(_) => {
                "gotenberg_failed"
            }
            RenderError::PdfTooSmall { .. } => "pdf_too_small",
            RenderError::NotPdf => "not_pdf",
            RenderError::UploadFailed(_) => "upload_failed",
            RenderError::ServerError(_) => "server_error",
        }
    }

    /// True when the caller sent something we cannot work with.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            RenderError::Unauthorized
                | RenderError::BadRequest(_)
                | RenderError::SourceFetchFailed(_)
                | RenderError::UnrecognizedFormat(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("unknown storage backend {0:?}, expected \"supabase\" or \"s3\"")]
    UnknownBackend(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
