use actix_web::{middleware, web, App, HttpServer};
use anyhow::Result;
use template_renderer::api::{configure_routes, ApiState};
use template_renderer::ServiceConfig;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    tracing::info!("Starting template renderer");

    prometheus::default_registry()
        .register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;

    let config = ServiceConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    if config.service_key.is_empty() {
        tracing::warn!("PDF_SERVICE_KEY is empty; every render request will be rejected");
    }
    if config.gotenberg_url.is_empty() {
        tracing::warn!("GOTENBERG_URL is empty; conversions will fail");
    }

    let host = config.host.clone();
    let port = config.port;

    let state = web::Data::new(ApiState::new(config).await?);
    let json_config = state.json_config();

    tracing::info!("Starting server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
