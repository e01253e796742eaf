//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::process::{ProcessBasicInfo, ProcessSeed};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for what the crawl collects
///
/// Every write is an upsert keyed by process number, so re-running an
/// enumeration or a collection never duplicates rows.
pub trait Storage {
    // ===== Seeds =====

    /// Inserts or refreshes seeds, returning how many were written
    fn save_seeds(&mut self, seeds: &[ProcessSeed]) -> StorageResult<usize>;

    /// Seeds last produced by `oab`, ordered by process number
    fn seeds_by_oab(&self, oab: &str) -> StorageResult<Vec<ProcessSeed>>;

    // ===== Basic info =====

    /// Inserts or refreshes one process snapshot
    ///
    /// A non-empty `info.oab` is added to the OABs already linked to the
    /// process; earlier ones are kept.
    fn save_basic_info(&mut self, info: &ProcessBasicInfo) -> StorageResult<()>;

    /// Snapshot of one process; `oab` is the first OAB that reached it
    fn basic_info(&self, process_id: &str) -> StorageResult<Option<ProcessBasicInfo>>;

    /// Snapshots of every process linked to `oab`, ordered by process number
    fn basic_info_by_oab(&self, oab: &str) -> StorageResult<Vec<ProcessBasicInfo>>;

    /// OABs linked to a process, in the order they were first seen
    fn oabs_for_process(&self, process_id: &str) -> StorageResult<Vec<String>>;
}
