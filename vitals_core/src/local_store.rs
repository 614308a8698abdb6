//! File-backed health store.
//!
//! Records live in a JSON Lines change log (`changes.jsonl`): every write
//! appends `Upsert` or `Delete` entries under an exclusive lock, and reads
//! replay the log under a shared lock. Granted permissions are kept in
//! `permissions.json`, replaced atomically on each grant.

use crate::error::StoreError;
use crate::metadata::{Change, RecordMetadata, StoredRecord};
use crate::permissions::{reconcile, PermissionRequest, PermissionStatus};
use crate::query::{GetRecordsOptions, ReadRecordsResponse};
use crate::record::{Record, RecordType};
use crate::store::{
    AvailabilityResponse, AvailabilityStatus, HealthStore, InsertRecordsResponse,
    ReadRecordResponse, StoreResult,
};
use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Page size used when a read does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 1000;

const CHANGES_FILE: &str = "changes.jsonl";
const PERMISSIONS_FILE: &str = "permissions.json";
const PAGE_TOKEN_PREFIX: &str = "offset:";

/// Persisted grant state
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct GrantState {
    granted: BTreeSet<RecordType>,
}

/// JSONL-backed store rooted at a data directory
pub struct JsonlHealthStore {
    dir: PathBuf,
    data_origin: String,
    availability: AvailabilityStatus,
}

impl JsonlHealthStore {
    /// Create a store in `dir`, stamping new records with `data_origin`
    pub fn new(dir: impl Into<PathBuf>, data_origin: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            data_origin: data_origin.into(),
            availability: AvailabilityStatus::Available,
        }
    }

    /// Report a different availability (for exercising unavailable paths)
    pub fn with_availability(mut self, availability: AvailabilityStatus) -> Self {
        self.availability = availability;
        self
    }

    pub fn changes_path(&self) -> PathBuf {
        self.dir.join(CHANGES_FILE)
    }

    fn permissions_path(&self) -> PathBuf {
        self.dir.join(PERMISSIONS_FILE)
    }

    /// Append changes to the log as one locked write
    pub fn append(&self, changes: &[Change]) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(io_failure)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.changes_path())
            .map_err(io_failure)?;

        file.lock_exclusive().map_err(io_failure)?;

        let mut buffer = String::new();
        // Terminate a torn line left by an interrupted writer
        if ends_mid_line(&file).map_err(io_failure)? {
            buffer.push('\n');
        }
        for change in changes {
            let line = serde_json::to_string(change)
                .map_err(|e| StoreError::new(format!("failed to encode change: {}", e)))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(buffer.as_bytes()).map_err(io_failure)?;
        writer.flush().map_err(io_failure)?;
        drop(writer);

        file.unlock().map_err(io_failure)?;
        tracing::debug!("Appended {} changes to {:?}", changes.len(), self.changes_path());
        Ok(())
    }

    /// Every change in log order; unreadable lines are skipped with a warning
    pub fn changes(&self) -> StoreResult<Vec<Change>> {
        let path = self.changes_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path).map_err(io_failure)?;
        file.lock_shared().map_err(io_failure)?;

        let reader = BufReader::new(&file);
        let mut changes = Vec::new();
        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(io_failure)?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Change>(&line) {
                Ok(change) => changes.push(change),
                Err(e) => {
                    tracing::warn!("Failed to parse change at line {}: {}", line_num + 1, e);
                }
            }
        }

        file.unlock().map_err(io_failure)?;
        Ok(changes)
    }

    /// Current records, folded from the change log
    pub fn snapshot(&self) -> StoreResult<HashMap<String, StoredRecord>> {
        let mut records: HashMap<String, StoredRecord> = HashMap::new();
        for change in self.changes()? {
            match change {
                Change::Upsert { record } => {
                    if let Some(previous) = records.get(record.id()) {
                        if let Err(e) = record.metadata.supersedes(&previous.metadata) {
                            tracing::warn!("Ignoring stale upsert of {}: {}", record.id(), e);
                            continue;
                        }
                    }
                    records.insert(record.id().to_string(), record);
                }
                Change::Delete { record_id } => {
                    records.remove(&record_id);
                }
            }
        }
        Ok(records)
    }

    /// Apply a change received from elsewhere (e.g. a sync peer)
    pub fn apply(&self, change: Change) -> StoreResult<()> {
        if let Change::Upsert { record } = &change {
            record
                .validate()
                .map_err(|e| StoreError::new(format!("rejected upsert: {}", e)))?;
            if let Some(previous) = self.snapshot()?.get(record.id()) {
                record
                    .metadata
                    .supersedes(&previous.metadata)
                    .map_err(|e| StoreError::new(format!("rejected upsert: {}", e)))?;
            }
        }
        self.append(&[change])
    }

    /// Delete records by id; unknown ids are an error and nothing is deleted
    pub fn delete_records(&self, record_ids: &[String]) -> StoreResult<()> {
        let current = self.snapshot()?;
        if let Some(unknown) = record_ids.iter().find(|id| !current.contains_key(*id)) {
            return Err(StoreError::new(format!("no record with id {}", unknown)));
        }
        let changes = record_ids
            .iter()
            .map(|id| Change::delete(id.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::new(e.to_string()))?;
        self.append(&changes)
    }

    fn load_grants(&self) -> StoreResult<GrantState> {
        let path = self.permissions_path();
        if !path.exists() {
            return Ok(GrantState::default());
        }

        let file = File::open(&path).map_err(io_failure)?;
        file.lock_shared().map_err(io_failure)?;
        let mut contents = String::new();
        let read = BufReader::new(&file).read_to_string(&mut contents);
        file.unlock().map_err(io_failure)?;
        read.map_err(io_failure)?;

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(e) => {
                // Fail closed: a corrupt grant file grants nothing
                tracing::warn!("Failed to parse {:?}: {}. Treating as no grants.", path, e);
                Ok(GrantState::default())
            }
        }
    }

    fn save_grants(&self, state: &GrantState) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(io_failure)?;

        let temp = NamedTempFile::new_in(&self.dir).map_err(io_failure)?;
        temp.as_file().lock_exclusive().map_err(io_failure)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(state)
                .map_err(|e| StoreError::new(format!("failed to encode grants: {}", e)))?;
            writer.write_all(contents.as_bytes()).map_err(io_failure)?;
            writer.flush().map_err(io_failure)?;
        }
        temp.as_file().sync_all().map_err(io_failure)?;
        temp.as_file().unlock().map_err(io_failure)?;

        temp.persist(self.permissions_path())
            .map_err(|e| io_failure(e.error))?;
        tracing::debug!("Saved {} grants", state.granted.len());
        Ok(())
    }

    fn status_for(&self, read: &[RecordType], write: &[RecordType]) -> StoreResult<PermissionStatus> {
        let grants = self.load_grants()?;
        let request = PermissionRequest::new(read.iter().copied(), write.iter().copied());
        let granted = grants
            .granted
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        Ok(reconcile(&request, granted))
    }
}

#[async_trait]
impl HealthStore for JsonlHealthStore {
    async fn check_availability(&self) -> StoreResult<AvailabilityResponse> {
        Ok(AvailabilityResponse {
            availability: self.availability,
        })
    }

    /// There is no consent dialog locally, so every requested type is granted
    async fn request_permissions(
        &self,
        read: &[RecordType],
        write: &[RecordType],
    ) -> StoreResult<PermissionStatus> {
        let mut grants = self.load_grants()?;
        grants.granted.extend(read.iter().chain(write).copied());
        self.save_grants(&grants)?;
        self.status_for(read, write)
    }

    async fn check_permissions(
        &self,
        read: &[RecordType],
        write: &[RecordType],
    ) -> StoreResult<PermissionStatus> {
        self.status_for(read, write)
    }

    async fn open_settings(&self) -> StoreResult<()> {
        Err(StoreError::new("the local store has no settings screen"))
    }

    async fn insert_records(&self, records: &[Record]) -> StoreResult<InsertRecordsResponse> {
        let now = Utc::now();
        let mut changes = Vec::with_capacity(records.len());
        let mut record_ids = Vec::with_capacity(records.len());

        for record in records {
            let id = Uuid::new_v4().to_string();
            let stored = StoredRecord::new(
                record.clone(),
                RecordMetadata {
                    id: id.clone(),
                    client_record_id: None,
                    client_record_version: 0,
                    last_modified_time: now,
                    data_origin: self.data_origin.clone(),
                },
            );
            let change = Change::upsert(stored)
                .map_err(|e| StoreError::new(format!("rejected record: {}", e)))?;
            changes.push(change);
            record_ids.push(id);
        }

        // One append keeps the insert all-or-nothing
        self.append(&changes)?;
        Ok(InsertRecordsResponse { record_ids })
    }

    async fn read_record(
        &self,
        record_type: RecordType,
        record_id: &str,
    ) -> StoreResult<ReadRecordResponse> {
        let mut records = self.snapshot()?;
        match records.remove(record_id) {
            Some(record) if record.record_type() == record_type => Ok(ReadRecordResponse { record }),
            _ => Err(StoreError::new(format!(
                "no {} record with id {}",
                record_type, record_id
            ))),
        }
    }

    async fn read_records(&self, options: &GetRecordsOptions) -> StoreResult<ReadRecordsResponse> {
        let offset = match &options.page_token {
            Some(token) => parse_page_token(token)?,
            None => 0,
        };
        let page_size = options
            .page_size
            .map(|s| s as usize)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let mut matching: Vec<StoredRecord> = self
            .snapshot()?
            .into_values()
            .filter(|r| r.record_type() == options.record_type)
            .filter(|r| {
                let (start, end) = r.record.time_span();
                options.time_range_filter.matches(start, end)
            })
            .filter(|r| {
                options.data_origin_filter.is_empty()
                    || options
                        .data_origin_filter
                        .iter()
                        .any(|o| *o == r.metadata.data_origin)
            })
            .collect();

        matching.sort_by(|a, b| {
            a.record
                .sort_time()
                .cmp(&b.record.sort_time())
                .then_with(|| a.id().cmp(b.id()))
        });
        if !options.is_ascending() {
            matching.reverse();
        }

        let records: Vec<StoredRecord> = matching.iter().skip(offset).take(page_size).cloned().collect();
        let next = offset + records.len();
        let page_token = if next < matching.len() {
            Some(format!("{}{}", PAGE_TOKEN_PREFIX, next))
        } else {
            None
        };

        tracing::debug!(
            "Local read of {}: {} of {} matching records from offset {}",
            options.record_type,
            records.len(),
            matching.len(),
            offset
        );
        Ok(ReadRecordsResponse {
            records,
            page_token,
        })
    }
}

fn ends_mid_line(mut file: &File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn parse_page_token(token: &str) -> StoreResult<usize> {
    token
        .strip_prefix(PAGE_TOKEN_PREFIX)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| StoreError::new(format!("unrecognised page token '{}'", token)))
}

fn io_failure(e: std::io::Error) -> StoreError {
    StoreError::new(format!("local store IO error: {}", e))
}
