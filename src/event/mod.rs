//! Webhook event filter.
//!
//! The dispatcher posts a database-change envelope for every row written to
//! the storage objects table. Only fresh inserts into the target bucket are
//! actionable; everything else is skipped with a short reason.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{INSERT_EVENT_TYPE, STORAGE_OBJECTS_TABLE, STORAGE_SCHEMA};
use crate::error::BrandingError;

/// Inbound webhook envelope.
///
/// Every field is optional and a value of the wrong JSON type reads as
/// absent, so any well-formed object is skipped instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub schema: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub table: Option<String>,
    #[serde(default, deserialize_with = "lenient_record")]
    pub record: Option<ObjectRecord>,
}

/// The storage object row carried by the event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub bucket_id: Option<String>,
    /// Object path inside the bucket
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

fn lenient_record<'de, D>(deserializer: D) -> Result<Option<ObjectRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

/// Why an event was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotInsert,
    NotStorageObject,
    WrongBucket,
    EmptyPath,
    /// The downloaded object already carries the branding comment
    AlreadyBranded,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::NotInsert => "Ignored: not an insert",
            SkipReason::NotStorageObject => "Ignored: not a storage object event",
            SkipReason::WrongBucket => "Ignored: wrong bucket",
            SkipReason::EmptyPath => "Ignored: empty path",
            SkipReason::AlreadyBranded => "Ignored: already branded",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of filtering one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Proceed {
        bucket_id: String,
        object_path: String,
    },
    Skip(SkipReason),
}

/// Parse the raw body into a [`StorageEvent`].
///
/// # Errors
///
/// Returns `BrandingError::RejectedInput` for anything that is not a JSON
/// object of the envelope shape.
pub fn parse_event(body: &[u8]) -> Result<StorageEvent, BrandingError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| BrandingError::RejectedInput(format!("Invalid JSON body: {e}")))?;

    if !value.is_object() {
        return Err(BrandingError::RejectedInput(
            "Event body must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| BrandingError::RejectedInput(format!("Invalid event envelope: {e}")))
}

/// Apply the filter rules in order: event type, table identity, bucket, path.
pub fn filter_event(body: &[u8], target_bucket: &str) -> Result<FilterOutcome, BrandingError> {
    let event = parse_event(body)?;
    Ok(classify(&event, target_bucket))
}

/// Filter an already parsed event.
pub fn classify(event: &StorageEvent, target_bucket: &str) -> FilterOutcome {
    if event.event_type.as_deref() != Some(INSERT_EVENT_TYPE) {
        return FilterOutcome::Skip(SkipReason::NotInsert);
    }

    if event.schema.as_deref() != Some(STORAGE_SCHEMA)
        || event.table.as_deref() != Some(STORAGE_OBJECTS_TABLE)
    {
        return FilterOutcome::Skip(SkipReason::NotStorageObject);
    }

    let record = event.record.as_ref();
    let bucket_id = record.and_then(|r| r.bucket_id.as_deref());
    if bucket_id != Some(target_bucket) {
        return FilterOutcome::Skip(SkipReason::WrongBucket);
    }

    match record.and_then(|r| r.name.as_deref()) {
        Some(path) if !path.is_empty() => FilterOutcome::Proceed {
            bucket_id: target_bucket.to_string(),
            object_path: path.to_string(),
        },
        _ => FilterOutcome::Skip(SkipReason::EmptyPath),
    }
}
