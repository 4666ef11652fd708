use actix_web::web;
use std::sync::Arc;

use super::error::json_error_handler;
use crate::core::{ServiceConfig, StorageBackend};
use crate::generators::{DocumentConverter, GotenbergConverter};
use crate::pdf::PdfValidator;
use crate::storage::s3::S3Storage;
use crate::storage::supabase::SupabaseStorage;
use crate::storage::{ObjectStore, StoragePublisher};
use crate::templates::{HttpTemplateSource, TemplateSource};

/// Everything a request needs, built once at startup. Holds no mutable
/// state, so concurrent requests share it freely.
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<ServiceConfig>,
    pub source: Arc<dyn TemplateSource>,
    pub converter: Arc<dyn DocumentConverter>,
    pub publisher: Arc<StoragePublisher>,
    pub validator: PdfValidator,
}

impl ApiState {
    pub async fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let store: Arc<dyn ObjectStore> = match &config.storage {
            StorageBackend::Supabase { url, service_key } => Arc::new(SupabaseStorage::new(
                client.clone(),
                url,
                service_key.clone(),
            )),
            StorageBackend::S3 { endpoint_url } => {
                Arc::new(S3Storage::new(endpoint_url.as_deref()).await)
            }
        };

        let source = Arc::new(HttpTemplateSource::new(client.clone()));
        let converter = Arc::new(GotenbergConverter::new(client, &config.gotenberg_url));

        Ok(Self::with_components(config, source, converter, store))
    }

    /// Assembles state from explicit collaborators.
    pub fn with_components(
        config: ServiceConfig,
        source: Arc<dyn TemplateSource>,
        converter: Arc<dyn DocumentConverter>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let publisher = Arc::new(StoragePublisher::new(store, config.bucket.clone()));
        let validator = PdfValidator::new(config.pdf_min_bytes);

        ApiState {
            config: Arc::new(config),
            source,
            converter,
            publisher,
            validator,
        }
    }

    /// JSON extractor settings for render bodies.
    pub fn json_config(&self) -> web::JsonConfig {
        web::JsonConfig::default()
            .limit(self.config.max_body_bytes)
            .error_handler(json_error_handler)
    }
}
