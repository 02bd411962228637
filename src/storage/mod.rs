//! Object storage collaborator.
//!
//! The pipeline only needs two operations: download an object by bucket and
//! path, and upload bytes back to a path. [`ObjectStorage`] captures that
//! contract; [`s3::S3ObjectStorage`] implements it for any S3-compatible
//! endpoint.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod s3;

pub use s3::S3ObjectStorage;

#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Download of {bucket}/{path} failed: {message}")]
    Download {
        bucket: String,
        path: String,
        message: String,
    },

    #[error("Upload of {bucket}/{path} failed: {message}")]
    Upload {
        bucket: String,
        path: String,
        message: String,
    },

    /// The storage client could not be configured
    #[error("Storage client error: {0}")]
    Client(String),
}

/// Options for a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    /// Replace an existing object at the same path instead of failing
    pub overwrite: bool,
}

impl UploadOptions {
    /// Overwriting upload with the given content type
    pub fn overwrite(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            overwrite: true,
        }
    }
}

/// Object storage operations used by the branding pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Download the full object body.
    async fn download(&self, bucket: &str, path: &str) -> Result<Bytes, StorageError>;

    /// Upload `data` to `bucket/path`.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: UploadOptions,
    ) -> Result<(), StorageError>;
}
