// Branding pipeline - one webhook delivery in, one JSON response out
//
// Received -> Filtered -> Fetching -> Compositing -> Encoding -> Injecting
//          -> Persisting -> Responded
//
// Every failure jumps straight to Responded. The upload is the only write and
// runs after every earlier stage has succeeded.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use crate::config::{BrandingConfig, Config};
use crate::error::BrandingError;
use crate::event::{self, FilterOutcome, SkipReason};
use crate::jpeg::{encode_jpeg, inject_metadata, is_branded, EncodedImage};
use crate::storage::{ObjectStorage, UploadOptions};
use crate::watermark::{composite, LogoSource};

pub const SUCCESS_MESSAGE: &str = "Image branded, metadata injected, and saved";

/// Pipeline state, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Filtered,
    Fetching,
    Compositing,
    Encoding,
    Injecting,
    Persisting,
    Responded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Filtered => "filtered",
            Stage::Fetching => "fetching",
            Stage::Compositing => "compositing",
            Stage::Encoding => "encoding",
            Stage::Injecting => "injecting",
            Stage::Persisting => "persisting",
            Stage::Responded => "responded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "Pipeline stage");
}

/// Successful end states of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Skipped(SkipReason),
    Branded { path: String },
}

/// JSON body returned to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandingResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Status code plus body for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResponse {
    pub status: u16,
    pub body: BrandingResponse,
}

impl PipelineResponse {
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        let body = match outcome {
            PipelineOutcome::Skipped(reason) => BrandingResponse {
                ok: true,
                message: Some(reason.message().to_string()),
                path: None,
                error: None,
            },
            PipelineOutcome::Branded { path } => BrandingResponse {
                ok: true,
                message: Some(SUCCESS_MESSAGE.to_string()),
                path: Some(path.clone()),
                error: None,
            },
        };
        Self { status: 200, body }
    }

    pub fn from_error(err: &BrandingError) -> Self {
        Self {
            status: err.to_http_status(),
            body: BrandingResponse {
                ok: false,
                message: None,
                path: None,
                error: Some(err.public_message()),
            },
        }
    }

    /// Serialized JSON body
    pub fn to_json(&self) -> Bytes {
        match serde_json::to_vec(&self.body) {
            Ok(json) => Bytes::from(json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Bytes::from_static(br#"{"ok":false,"error":"Internal processing error"}"#)
            }
        }
    }
}

/// Orchestrates filter, fetch, composite, encode, inject and upload.
///
/// Holds only read-only state, so one instance is shared by every connection.
#[derive(Clone)]
pub struct BrandingPipeline {
    config: Arc<Config>,
    storage: Option<Arc<dyn ObjectStorage>>,
    logo_source: Arc<dyn LogoSource>,
}

impl BrandingPipeline {
    /// `storage` is `None` when credentials were not configured; actionable
    /// events then fail with a configuration error.
    pub fn new(
        config: Arc<Config>,
        storage: Option<Arc<dyn ObjectStorage>>,
        logo_source: Arc<dyn LogoSource>,
    ) -> Self {
        Self {
            config,
            storage,
            logo_source,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one invocation and turn its result into a response.
    pub async fn handle(&self, body: &[u8]) -> PipelineResponse {
        let response = match self.run(body).await {
            Ok(outcome) => {
                match &outcome {
                    PipelineOutcome::Skipped(reason) => {
                        tracing::info!(reason = %reason, "Event skipped");
                    }
                    PipelineOutcome::Branded { path } => {
                        tracing::info!(path = %path, "Image branded");
                    }
                }
                PipelineResponse::from_outcome(&outcome)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    kind = err.kind(),
                    status = err.to_http_status(),
                    "Branding failed"
                );
                PipelineResponse::from_error(&err)
            }
        };

        enter(Stage::Responded);
        response
    }

    /// Run one invocation.
    ///
    /// # Errors
    ///
    /// Returns the first failure met; nothing is uploaded in that case.
    pub async fn run(&self, body: &[u8]) -> Result<PipelineOutcome, BrandingError> {
        enter(Stage::Received);
        let branding = &self.config.branding;

        let (bucket, path) = match event::filter_event(body, &branding.target_bucket)? {
            FilterOutcome::Proceed {
                bucket_id,
                object_path,
            } => (bucket_id, object_path),
            FilterOutcome::Skip(reason) => return Ok(PipelineOutcome::Skipped(reason)),
        };
        enter(Stage::Filtered);

        // Both must be present before any network call
        let logo_url = branding
            .logo_url()
            .ok_or_else(|| {
                BrandingError::Configuration("Logo URL is not configured".to_string())
            })?
            .to_string();
        let storage = self.storage.as_ref().ok_or_else(|| {
            BrandingError::Configuration("Storage credentials are not configured".to_string())
        })?;

        enter(Stage::Fetching);
        let base = storage.download(&bucket, &path).await?;
        tracing::debug!(bucket = %bucket, path = %path, bytes = base.len(), "Base image downloaded");

        if branding.skip_already_branded && is_branded(&base) {
            return Ok(PipelineOutcome::Skipped(SkipReason::AlreadyBranded));
        }

        let logo = self.logo_source.fetch(&logo_url).await?;

        let encoded = brand_blocking(base, logo, branding.clone()).await?;

        enter(Stage::Persisting);
        let size = encoded.len();
        storage
            .upload(
                &bucket,
                &path,
                encoded.data,
                UploadOptions::overwrite(encoded.content_type),
            )
            .await?;
        tracing::debug!(bucket = %bucket, path = %path, bytes = size, "Branded image saved");

        Ok(PipelineOutcome::Branded { path })
    }
}

/// Composite, encode and inject on the blocking pool.
async fn brand_blocking(
    base: Bytes,
    logo: Bytes,
    branding: BrandingConfig,
) -> Result<EncodedImage, BrandingError> {
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        brand(&base, &logo, &branding)
    })
    .await
    .map_err(|e| BrandingError::Unexpected(format!("Branding task failed: {e}")))?
}

/// Synchronous core: decode both images, overlay the logo, encode, inject.
pub fn brand(
    base: &[u8],
    logo: &[u8],
    branding: &BrandingConfig,
) -> Result<EncodedImage, BrandingError> {
    enter(Stage::Compositing);
    let canvas = composite(base, logo, branding)?;

    enter(Stage::Encoding);
    let encoded = encode_jpeg(&canvas, branding.jpeg_quality)?;

    enter(Stage::Injecting);
    Ok(inject_metadata(encoded, branding))
}
