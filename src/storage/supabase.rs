use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;

use super::{ObjectStore, StorageError};

/// Supabase Storage over its REST API, authenticated with a service key.
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(client: reqwest::Client, base_url: &str, service_key: impl Into<String>) -> Self {
        SupabaseStorage {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    pub fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put_new(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.object_url(bucket, path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "false")
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, "max-age=3600")
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::CONFLICT {
            return Err(StorageError::AlreadyExists(format!("{}/{}", bucket, path)));
        }

        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
