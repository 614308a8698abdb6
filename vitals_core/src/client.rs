//! Validating facade over a [`HealthStore`].
//!
//! Every operation validates its input before the store sees it, checks that
//! the record types it touches are granted, logs store failures, and hands
//! them back unchanged. The one exception is
//! [`HealthClient::open_settings`], which is best effort: its failure is
//! logged and swallowed. Nothing is retried, cached, or paged implicitly.

use crate::error::{Error, Result, StoreError, ValidationError};
use crate::metadata::StoredRecord;
use crate::permissions::{reconcile, PermissionRequest, PermissionStatus};
use crate::query::{GetRecordsOptions, ReadRecordsResponse};
use crate::record::{Record, RecordType};
use std::collections::BTreeSet;
use crate::store::{AvailabilityStatus, HealthStore};

/// Direction of access an operation needs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// Entry point for callers working with a health store
pub struct HealthClient<S> {
    store: S,
}

impl<S: HealthStore> HealthClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn check_availability(&self) -> Result<AvailabilityStatus> {
        let response = self
            .store
            .check_availability()
            .await
            .map_err(|e| store_failure("check_availability", e))?;
        tracing::debug!("Health store availability: {:?}", response.availability);
        Ok(response.availability)
    }

    /// Fail with `NotAvailable` unless the store can take calls
    pub async fn ensure_available(&self) -> Result<()> {
        let status = self.check_availability().await?;
        if status.is_usable() {
            Ok(())
        } else {
            tracing::warn!("Health store is not usable: {:?}", status);
            Err(Error::NotAvailable(status))
        }
    }

    /// Ask the store to grant `request`; `has_all_permissions` is recomputed locally
    pub async fn request_permissions(
        &self,
        request: &PermissionRequest,
    ) -> Result<PermissionStatus> {
        let (read, write) = split(request);
        let status = self
            .store
            .request_permissions(&read, &write)
            .await
            .map_err(|e| store_failure("request_permissions", e))?;
        Ok(reconciled(request, status))
    }

    pub async fn check_permissions(&self, request: &PermissionRequest) -> Result<PermissionStatus> {
        let (read, write) = split(request);
        let status = self
            .store
            .check_permissions(&read, &write)
            .await
            .map_err(|e| store_failure("check_permissions", e))?;
        Ok(reconciled(request, status))
    }

    /// Best effort: failures are logged, never returned
    pub async fn open_settings(&self) {
        if let Err(e) = self.store.open_settings().await {
            tracing::warn!("[health store] unable to open settings: {}", e);
        }
    }

    /// Insert all records or none; returns one id per record, in order
    pub async fn insert_records(&self, records: &[Record]) -> Result<Vec<String>> {
        if records.is_empty() {
            return Err(ValidationError::MissingField("records".into()).into());
        }
        for (index, record) in records.iter().enumerate() {
            record.validate().map_err(|e| {
                tracing::debug!("Rejected record {} ({}): {}", index, record.record_type(), e);
                Error::Validation(e)
            })?;
        }
        let types: BTreeSet<RecordType> = records.iter().map(Record::record_type).collect();
        self.ensure_access(Access::Write, types).await?;

        let response = self
            .store
            .insert_records(records)
            .await
            .map_err(|e| store_failure("insert_records", e))?;

        if response.record_ids.len() != records.len() {
            let e = StoreError::new(format!(
                "store returned {} ids for {} records",
                response.record_ids.len(),
                records.len()
            ));
            return Err(store_failure("insert_records", e));
        }

        tracing::info!("Inserted {} records", records.len());
        Ok(response.record_ids)
    }

    pub async fn read_record(
        &self,
        record_type: RecordType,
        record_id: &str,
    ) -> Result<StoredRecord> {
        if record_id.trim().is_empty() {
            return Err(ValidationError::MissingField("recordId".into()).into());
        }
        self.ensure_access(Access::Read, [record_type]).await?;

        let response = self
            .store
            .read_record(record_type, record_id)
            .await
            .map_err(|e| store_failure("read_record", e))?;

        let record = response.record;
        if record.record_type() != record_type {
            let e = StoreError::new(format!(
                "asked for a {} record but the store returned {}",
                record_type,
                record.record_type()
            ));
            return Err(store_failure("read_record", e));
        }
        if let Err(e) = record.metadata.validate() {
            let e = StoreError::new(format!("store returned invalid metadata: {}", e));
            return Err(store_failure("read_record", e));
        }
        Ok(record)
    }

    /// Read exactly one page; resubmit with the returned token for more
    pub async fn read_records(&self, options: &GetRecordsOptions) -> Result<ReadRecordsResponse> {
        options.validate()?;
        self.ensure_access(Access::Read, [options.record_type]).await?;

        let response = self
            .store
            .read_records(options)
            .await
            .map_err(|e| store_failure("read_records", e))?;

        tracing::debug!(
            "Read {} {} records (more pages: {})",
            response.records.len(),
            options.record_type,
            response.has_more()
        );
        Ok(response)
    }

    /// Fail with `Permission` unless every type is granted for `access`
    async fn ensure_access(
        &self,
        access: Access,
        types: impl IntoIterator<Item = RecordType>,
    ) -> Result<()> {
        let types: BTreeSet<RecordType> = types.into_iter().collect();
        let request = match access {
            Access::Read => PermissionRequest {
                read: types,
                write: BTreeSet::new(),
            },
            Access::Write => PermissionRequest {
                read: BTreeSet::new(),
                write: types,
            },
        };

        let status = self.check_permissions(&request).await?;
        for record_type in request.all_types() {
            if let Err(e) = status.ensure_granted(record_type) {
                tracing::warn!("{:?} access to {} refused: not granted", access, record_type);
                return Err(e);
            }
        }
        Ok(())
    }
}

fn split(request: &PermissionRequest) -> (Vec<RecordType>, Vec<RecordType>) {
    (
        request.read.iter().copied().collect(),
        request.write.iter().copied().collect(),
    )
}

fn reconciled(request: &PermissionRequest, status: PermissionStatus) -> PermissionStatus {
    let reported = status.has_all_permissions;
    let status = reconcile(request, status.granted_permissions);
    if reported != status.has_all_permissions {
        tracing::debug!(
            "Store reported has_all_permissions={} but granted set gives {}",
            reported,
            status.has_all_permissions
        );
    }
    status
}

fn store_failure(operation: &str, e: StoreError) -> Error {
    tracing::error!("[health store] {} failed: {}", operation, e);
    Error::Store(e)
}
