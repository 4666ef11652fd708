use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CACHE_CONTROL;

use crate::core::{RenderError, RenderResult};

/// Where template archives come from.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, url: &str) -> RenderResult<Bytes>;
}

/// Downloads templates over HTTP, bypassing any cache on every request.
pub struct HttpTemplateSource {
    client: reqwest::Client,
}

impl HttpTemplateSource {
    pub fn new(client: reqwest::Client) -> Self {
        HttpTemplateSource { client }
    }
}

#[async_trait]
impl TemplateSource for HttpTemplateSource {
    async fn fetch(&self, url: &str) -> RenderResult<Bytes> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| RenderError::SourceFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::SourceFetchFailed(format!(
                "{} answered {}",
                url, status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| RenderError::SourceFetchFailed(e.to_string()))
    }
}
