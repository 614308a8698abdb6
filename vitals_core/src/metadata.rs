//! Record provenance and the change log used for sync.

use crate::error::ValidationError;
use crate::record::{Record, RecordType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned provenance and versioning for a persisted record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_record_id: Option<String>,
    #[serde(default)]
    pub client_record_version: u64,
    pub last_modified_time: DateTime<Utc>,
    pub data_origin: String,
}

impl RecordMetadata {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("metadata.id".into()));
        }
        if let Some(client_id) = &self.client_record_id {
            if client_id.trim().is_empty() {
                return Err(ValidationError::InvalidValue(
                    "clientRecordId must not be blank".into(),
                ));
            }
        }
        Ok(())
    }

    /// Whether a write carrying `self` may replace `previous`.
    ///
    /// Versions only move forward for the same client identity; an equal
    /// version is an idempotent replay.
    pub fn supersedes(&self, previous: &RecordMetadata) -> Result<(), ValidationError> {
        if self.client_record_id != previous.client_record_id {
            return Ok(());
        }
        if self.client_record_version < previous.client_record_version {
            return Err(ValidationError::InvalidValue(format!(
                "clientRecordVersion {} is older than stored version {}",
                self.client_record_version, previous.client_record_version
            )));
        }
        Ok(())
    }
}

/// A record as persisted by the store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(flatten)]
    pub record: Record,
    pub metadata: RecordMetadata,
}

impl StoredRecord {
    pub fn new(record: Record, metadata: RecordMetadata) -> Self {
        Self { record, metadata }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn record_type(&self) -> RecordType {
        self.record.record_type()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.metadata.validate()?;
        self.record.validate()
    }
}

/// One entry of a change log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Change {
    Upsert { record: StoredRecord },
    Delete { record_id: String },
}

impl Change {
    /// Wrap a record as an upsert; the record must be valid
    pub fn upsert(record: StoredRecord) -> Result<Self, ValidationError> {
        record.validate()?;
        Ok(Change::Upsert { record })
    }

    /// A deletion carries only the identifier
    pub fn delete(record_id: impl Into<String>) -> Result<Self, ValidationError> {
        let record_id = record_id.into();
        if record_id.trim().is_empty() {
            return Err(ValidationError::MissingField("recordId".into()));
        }
        Ok(Change::Delete { record_id })
    }

    pub fn record_id(&self) -> &str {
        match self {
            Change::Upsert { record } => record.id(),
            Change::Delete { record_id } => record_id,
        }
    }
}
