//! The health store boundary.
//!
//! `HealthStore` is the narrow capability the core calls through; whatever
//! actually persists records (an OS health service bridge, the local JSONL
//! store) implements it. Every method is a suspend point and reports
//! failures as an opaque [`StoreError`].

use crate::error::StoreError;
use crate::metadata::StoredRecord;
use crate::permissions::PermissionStatus;
use crate::query::{GetRecordsOptions, ReadRecordsResponse};
use crate::record::{Record, RecordType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Whether the health store can be used on this device
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Available,
    NotInstalled,
    NotSupported,
    Installed,
    Unavailable,
}

impl AvailabilityStatus {
    /// `Available` and `Installed` both mean the store can take calls
    pub fn is_usable(self) -> bool {
        matches!(
            self,
            AvailabilityStatus::Available | AvailabilityStatus::Installed
        )
    }
}

/// Wire shape of an availability check
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub availability: AvailabilityStatus,
}

/// Wire shape of an insert: one id per input record, in input order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRecordsResponse {
    pub record_ids: Vec<String>,
}

/// Wire shape of a single-record read
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadRecordResponse {
    pub record: StoredRecord,
}

#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn check_availability(&self) -> StoreResult<AvailabilityResponse>;

    async fn request_permissions(
        &self,
        read: &[RecordType],
        write: &[RecordType],
    ) -> StoreResult<PermissionStatus>;

    async fn check_permissions(
        &self,
        read: &[RecordType],
        write: &[RecordType],
    ) -> StoreResult<PermissionStatus>;

    /// Launch the store's settings screen
    async fn open_settings(&self) -> StoreResult<()>;

    async fn insert_records(&self, records: &[Record]) -> StoreResult<InsertRecordsResponse>;

    async fn read_record(
        &self,
        record_type: RecordType,
        record_id: &str,
    ) -> StoreResult<ReadRecordResponse>;

    async fn read_records(&self, options: &GetRecordsOptions) -> StoreResult<ReadRecordsResponse>;
}
