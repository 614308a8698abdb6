#![forbid(unsafe_code)]

//! Typed health-record model and query layer for the Vitals system.
//!
//! This crate provides:
//! - Unit-tagged measurements (mass, length, energy, ...)
//! - Record variants with per-variant validation
//! - Record metadata and the upsert/delete change log
//! - Time-filtered, paginated read queries
//! - Permission reconciliation
//! - The `HealthStore` boundary, a validating client, and a local file store

pub mod error;
pub mod units;
pub mod time;
pub mod record;
pub mod metadata;
pub mod query;
pub mod permissions;
pub mod store;
pub mod client;
pub mod local_store;
pub mod config;
pub mod logging;
pub mod demo;

// Re-export commonly used types
pub use error::{Error, Result, StoreError, ValidationError};
pub use units::*;
pub use time::{Instant, Interval, ZoneOffset};
pub use record::*;
pub use metadata::{Change, RecordMetadata, StoredRecord};
pub use query::{GetRecordsOptions, ReadRecordsResponse, TimeRangeFilter};
pub use permissions::{reconcile, PermissionRequest, PermissionStatus};
pub use store::{AvailabilityStatus, HealthStore};
pub use client::HealthClient;
pub use local_store::JsonlHealthStore;
pub use config::Config;
