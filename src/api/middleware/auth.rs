use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::HeaderValue;
use actix_web::middleware::Next;
use actix_web::{web, Error, ResponseError};

use crate::api::state::ApiState;
use crate::core::RenderError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects the request with `401 unauthorized` before the body is read
/// unless `x-api-key` equals the configured service key.
pub async fn require_api_key(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let authorized = req
        .app_data::<web::Data<ApiState>>()
        .is_some_and(|state| key_matches(&state.config.service_key, req.headers().get(API_KEY_HEADER)));

    if !authorized {
        tracing::warn!(path = %req.path(), "rejected request without a valid api key");
        crate::api::metrics::record_failure(RenderError::Unauthorized.code());
        let response = RenderError::Unauthorized.error_response();
        return Ok(req.into_response(response));
    }

    next.call(req).await.map(ServiceResponse::map_into_boxed_body)
}

/// An empty configured key matches nothing.
pub fn key_matches(configured: &str, presented: Option<&HeaderValue>) -> bool {
    if configured.is_empty() {
        return false;
    }
    presented
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| key == configured)
}
