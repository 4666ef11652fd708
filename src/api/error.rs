use actix_web::error::JsonPayloadError;
use actix_web::{error::ResponseError, http::StatusCode, HttpRequest, HttpResponse};

use crate::core::RenderError;
use crate::models::ErrorBody;

impl ResponseError for RenderError {
    fn status_code(&self) -> StatusCode {
        match self {
            RenderError::Unauthorized => StatusCode::UNAUTHORIZED,
            RenderError::BadRequest(_)
            | RenderError::SourceFetchFailed(_)
            | RenderError::UnrecognizedFormat(_) => StatusCode::BAD_REQUEST,
            RenderError::ConversionFailed(_)
            | RenderError::ConversionUnreachable(_)
            | RenderError::PdfTooSmall { .. }
            | RenderError::NotPdf
            | RenderError::UploadFailed(_) => StatusCode::BAD_GATEWAY,
            RenderError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.code()))
    }
}

/// Malformed, oversized or non-JSON bodies answer `bad_request` in the
/// service's own error shape rather than actix's default text.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(error = %err, "rejected render body");
    let err = RenderError::BadRequest(err.to_string());
    super::metrics::record_failure(err.code());
    err.into()
}

pub type ApiResult<T> = Result<T, RenderError>;
