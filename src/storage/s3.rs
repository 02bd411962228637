// S3-compatible storage backend

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use super::{ObjectStorage, StorageError, UploadOptions};
use crate::config::StorageConfig;

/// [`ObjectStorage`] over the AWS S3 SDK, pointed at a custom endpoint.
#[derive(Debug, Clone)]
pub struct S3ObjectStorage {
    client: S3Client,
}

impl S3ObjectStorage {
    /// Build a client from static credentials.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Client` when endpoint or credentials are missing.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(StorageError::Client(format!(
                "Storage configuration incomplete: missing {}",
                missing.join(", ")
            )));
        }

        let endpoint = config.endpoint.clone().unwrap_or_default();
        let credentials = aws_credential_types::Credentials::new(
            config.access_key.clone().unwrap_or_default(),
            config.secret_key.clone().unwrap_or_default(),
            None,
            None,
            "heritage-brander",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .endpoint_url(&endpoint)
            .region(aws_config::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::info!(
            endpoint = %endpoint,
            region = %config.region,
            force_path_style = config.force_path_style,
            "S3 storage client configured"
        );

        Ok(Self {
            client: S3Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn download(&self, bucket: &str, path: &str) -> Result<Bytes, StorageError> {
        let download_error = |message: String| StorageError::Download {
            bucket: bucket.to_string(),
            path: path.to_string(),
            message,
        };

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| download_error(DisplayErrorContext(&e).to_string()))?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| download_error(format!("Failed to read S3 body: {e}")))?;

        Ok(body.into_bytes())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: UploadOptions,
    ) -> Result<(), StorageError> {
        let size = data.len();
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(path)
            .content_type(options.content_type)
            .body(ByteStream::from(data));

        // S3 PUT replaces by default; refuse to clobber only when asked
        if !options.overwrite {
            request = request.if_none_match("*");
        }

        request.send().await.map_err(|e| StorageError::Upload {
            bucket: bucket.to_string(),
            path: path.to_string(),
            message: DisplayErrorContext(&e).to_string(),
        })?;

        tracing::debug!(bucket = %bucket, path = %path, bytes = size, "Object uploaded");

        Ok(())
    }
}
