use actix_web::{web, HttpResponse};
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;

use super::error::ApiResult;
use super::metrics;
use super::state::ApiState;
use crate::core::RenderError;
use crate::models::{RenderPayload, RenderRequest, RenderResponse};
use crate::templates::rewrite_archive;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// `POST /render`: fetch, rewrite, convert, validate, upload.
///
/// Authentication has already happened in the middleware. Every failure,
/// including a panic anywhere in the pipeline, leaves as a [`RenderError`].
pub async fn render(
    payload: web::Json<RenderPayload>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let timer = metrics::RENDER_DURATION.start_timer();
    let outcome = AssertUnwindSafe(run_pipeline(payload.into_inner(), &state))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(RenderError::ServerError("render pipeline panicked".to_string())));
    timer.observe_duration();

    match outcome {
        Ok(response) => {
            metrics::record_success(response.substitutions, response.bytes);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(err) => {
            if err.is_client_fault() {
                tracing::warn!(code = err.code(), error = %err, "render rejected");
            } else {
                tracing::error!(code = err.code(), error = %err, "render failed");
            }
            metrics::record_failure(err.code());
            Err(err)
        }
    }
}

async fn run_pipeline(payload: RenderPayload, state: &ApiState) -> ApiResult<RenderResponse> {
    let request = RenderRequest::try_from(payload)?;
    tracing::info!(
        code = %request.code,
        source = %source_for_log(&request.source_url),
        "render requested"
    );

    let template = state.source.fetch(&request.source_url).await?;

    let values = request.values;
    let max_part_bytes = state.config.max_part_bytes;
    let rewritten = web::block(move || rewrite_archive(&template, &values, max_part_bytes))
        .await
        .map_err(|e| RenderError::ServerError(format!("rewrite task failed: {}", e)))??;

    let pdf = state.converter.convert(rewritten.archive).await?;
    state.validator.validate(&pdf)?;

    let bytes = pdf.len();
    let path = state.publisher.publish(pdf, &request.code).await?;

    tracing::info!(
        code = %request.code,
        path = %path,
        substitutions = rewritten.substitutions,
        bytes,
        "render stored"
    );

    Ok(RenderResponse::new(path, rewritten.substitutions, bytes))
}

/// Host and path only. Signed storage URLs carry credentials in the query.
fn source_for_log(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()),
        Err(_) => "<unparseable url>".to_string(),
    }
}
