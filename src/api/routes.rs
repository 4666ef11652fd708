use actix_web::middleware::from_fn;
use actix_web::web;

use super::handlers;
use super::metrics::metrics_endpoint;
use super::middleware::require_api_key;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Unauthenticated probes
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(metrics_endpoint))

        .service(
            web::resource("/render")
                .wrap(from_fn(require_api_key))
                .route(web::post().to(handlers::render)),
        );
}
