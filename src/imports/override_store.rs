//! # Override Store
//!
//! In-memory table of import bodies supplied up front by the caller. Consulted by the fallback
//! chain once the user resolver declines an import.
//!
//! Records are identified by `(parent_context, path)` but that pair is not unique: `add` always
//! appends and every lookup returns the earliest-added match. Records are never evicted; they
//! stay until `del` removes them or the store is dropped.
//!
//! Guarded by a single reader/writer lock. [`OverrideStore::entries_snapshot`] holds the read
//! lock only while copying.

use crate::constants::{ROOT_CONTEXT, STRING_CONTEXT_SENTINEL};
use crate::error::{ImportError, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, trace};

/// One import body known to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    pub parent_context: String,
    pub path: String,
    bytes: Vec<u8>,
    created_at: DateTime<Utc>,
}

impl ImportRecord {
    pub fn new(parent_context: impl Into<String>, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            parent_context: normalize_parent_context(&parent_context.into()).to_string(),
            path: path.into(),
            bytes,
            created_at: Utc::now(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Body as text; invalid UTF-8 is replaced rather than rejected
    pub fn source(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Modification time. Records are immutable, so this is the creation time.
    pub fn mod_time(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn matches(&self, parent_context: &str, path: &str) -> bool {
        self.parent_context == normalize_parent_context(parent_context) && self.path == path
    }
}

/// Map an empty or sentinel parent context onto the canonical root marker
pub fn normalize_parent_context(parent_context: &str) -> &str {
    if parent_context.is_empty() || parent_context == STRING_CONTEXT_SENTINEL {
        ROOT_CONTEXT
    } else {
        parent_context
    }
}

#[derive(Debug, Default)]
pub struct OverrideStore {
    records: RwLock<Vec<ImportRecord>>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the store to empty
    pub fn init(&self) {
        self.records.write().clear();
    }

    pub fn add(&self, parent_context: &str, path: &str, bytes: impl Into<Vec<u8>>) {
        let record = ImportRecord::new(parent_context, path, bytes.into());
        debug!(
            parent = %record.parent_context,
            path = %record.path,
            size = record.bytes.len(),
            "Adding override import"
        );
        self.records.write().push(record);
    }

    /// Remove every record with this path. Returns how many were removed.
    pub fn del(&self, path: &str) -> usize {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|record| record.path != path);
        let removed = before - records.len();
        debug!(path, removed, "Deleted override import");
        removed
    }

    pub fn get(&self, parent_context: &str, path: &str) -> Result<Vec<u8>> {
        self.records
            .read()
            .iter()
            .find(|record| record.matches(parent_context, path))
            .map(|record| record.bytes.clone())
            .ok_or_else(|| ImportError::NotFound {
                parent: normalize_parent_context(parent_context).to_string(),
                path: path.to_string(),
            })
    }

    /// Point-in-time copy of every record, safe to iterate without holding the lock
    pub fn entries_snapshot(&self) -> Vec<ImportRecord> {
        self.records.read().clone()
    }

    /// Earliest record in `entries` matching `(parent_context, path)`
    pub fn find_entry<'a>(
        entries: &'a [ImportRecord],
        parent_context: &str,
        path: &str,
    ) -> Option<&'a ImportRecord> {
        entries
            .iter()
            .find(|record| record.matches(parent_context, path))
    }

    /// Refresh an import from its on-disk modification time.
    ///
    /// Intentionally inert: records are only replaced through `add`/`del`.
    pub fn update(&self, name: &str) {
        let _records = self.records.write();
        trace!(name, "Override update requested; modification tracking is disabled");
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
