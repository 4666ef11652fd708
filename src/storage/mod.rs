pub mod s3;
pub mod supabase;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{RenderError, RenderResult};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object {0} already exists")]
    AlreadyExists(String),

    #[error("store rejected upload with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("store unreachable: {0}")]
    Transport(String),
}

/// A bucket-addressed object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `data` at `path`, failing instead of replacing an existing
    /// object.
    async fn put_new(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// Stores rendered PDFs under `tmp/<code>/<uuid>.pdf`.
pub struct StoragePublisher {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl StoragePublisher {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        StoragePublisher {
            store,
            bucket: bucket.into(),
        }
    }

    /// Uploads under a fresh identifier and returns `<bucket>/<path>`.
    pub async fn publish(&self, pdf: Bytes, code: &str) -> RenderResult<String> {
        let path = artifact_path(code, Uuid::new_v4());

        self.store
            .put_new(&self.bucket, &path, pdf, PDF_CONTENT_TYPE)
            .await
            .map_err(|e| RenderError::UploadFailed(e.to_string()))?;

        Ok(format!("{}/{}", self.bucket, path))
    }
}

pub fn artifact_path(code: &str, id: Uuid) -> String {
    format!("tmp/{}/{}.pdf", code, id)
}
