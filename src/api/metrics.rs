use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

pub static RENDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "render_requests_total",
        "Render requests by outcome code",
        &["outcome"]
    )
    .expect("render_requests_total registers once")
});

pub static RENDER_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "render_duration_seconds",
        "Time spent in the render pipeline",
        vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("render_duration_seconds registers once")
});

pub static RENDER_SUBSTITUTIONS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "render_substitutions",
        "Token occurrences replaced per successful render",
        vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]
    )
    .expect("render_substitutions registers once")
});

pub static RENDER_PDF_BYTES: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "render_pdf_bytes",
        "Size of stored PDFs",
        prometheus::exponential_buckets(51_200.0, 2.0, 10).unwrap_or_default()
    )
    .expect("render_pdf_bytes registers once")
});

pub fn record_success(substitutions: usize, bytes: usize) {
    RENDER_REQUESTS.with_label_values(&["ok"]).inc();
    RENDER_SUBSTITUTIONS.observe(substitutions as f64);
    RENDER_PDF_BYTES.observe(bytes as f64);
}

pub fn record_failure(code: &str) {
    RENDER_REQUESTS.with_label_values(&[code]).inc();
}

pub async fn metrics_endpoint() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(buffer),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}
