use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::{ObjectStore, StorageError};

/// S3-compatible storage (AWS, R2, MinIO). Credentials and region come from
/// the standard AWS environment chain.
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub async fn new(endpoint_url: Option<&str>) -> Self {
        let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let mut config = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint_url {
            config = config.endpoint_url(endpoint).force_path_style(true);
        }

        Self::with_client(Client::from_conf(config.build()))
    }

    pub fn with_client(client: Client) -> Self {
        S3Storage { client }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_new(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(path)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .if_none_match("*")
            .send()
            .await
            .map_err(|err| {
                let status = err.raw_response().map(|raw| raw.status().as_u16());
                let message = DisplayErrorContext(&err).to_string();
                match status {
                    Some(412) => StorageError::AlreadyExists(format!("{}/{}", bucket, path)),
                    Some(status) => StorageError::Rejected { status, message },
                    None => StorageError::Transport(message),
                }
            })?;

        Ok(())
    }
}
