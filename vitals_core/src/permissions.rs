//! Requested-versus-granted permission reconciliation.
//!
//! The requested sets are always supplied by the caller (usually from
//! [`crate::config::PermissionsConfig`]); nothing here holds defaults.

use crate::error::{Error, Result};
use crate::record::RecordType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Record types a caller wants to read and write
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    #[serde(default)]
    pub read: BTreeSet<RecordType>,
    #[serde(default)]
    pub write: BTreeSet<RecordType>,
}

impl PermissionRequest {
    pub fn new<R, W>(read: R, write: W) -> Self
    where
        R: IntoIterator<Item = RecordType>,
        W: IntoIterator<Item = RecordType>,
    {
        Self {
            read: read.into_iter().collect(),
            write: write.into_iter().collect(),
        }
    }

    /// Union of the read and write sets
    pub fn all_types(&self) -> BTreeSet<RecordType> {
        self.read.union(&self.write).copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.write.is_empty()
    }
}

/// What the store reports back for a permission request or check
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionStatus {
    pub granted_permissions: Vec<String>,
    pub has_all_permissions: bool,
}

impl PermissionStatus {
    /// Whether `record_type` appears among the granted permissions
    pub fn is_granted(&self, record_type: RecordType) -> bool {
        self.granted_permissions
            .iter()
            .any(|g| g == record_type.as_str())
    }

    /// Fail with a permission error unless `record_type` was granted
    pub fn ensure_granted(&self, record_type: RecordType) -> Result<()> {
        if self.is_granted(record_type) {
            Ok(())
        } else {
            Err(Error::Permission(format!(
                "access to {} records was not granted",
                record_type
            )))
        }
    }
}

/// Combine a request with the store's granted set.
///
/// The granted list is exposed unmodified; `has_all_permissions` holds iff
/// every requested read and write type is present in it.
pub fn reconcile(request: &PermissionRequest, granted: Vec<String>) -> PermissionStatus {
    let has_all_permissions = request
        .all_types()
        .iter()
        .all(|t| granted.iter().any(|g| g == t.as_str()));

    PermissionStatus {
        granted_permissions: granted,
        has_all_permissions,
    }
}

/// Requested types missing from the granted list, in declaration order
pub fn missing(request: &PermissionRequest, status: &PermissionStatus) -> Vec<RecordType> {
    request
        .all_types()
        .into_iter()
        .filter(|t| !status.is_granted(*t))
        .collect()
}
