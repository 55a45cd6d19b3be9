//! Memoization of loaded uploads by input fingerprint.
//!
//! Every request re-runs the whole load/aggregate pipeline, so re-submitting
//! the same file (e.g. to change the hotspot limit) would otherwise re-parse
//! it. The cache keys parsed records by the SHA-256 digest of the raw bytes
//! and holds at most `capacity` entries, evicting the oldest first. Failed
//! loads are never cached.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use accident_hotspots_accident_models::AccidentRecord;
use sha2::{Digest as _, Sha256};

use crate::{LoadError, load_records};

/// Default number of distinct uploads kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// Returns the hex-encoded SHA-256 digest of `bytes`.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Bounded cache of loaded record sets keyed by [`fingerprint`].
#[derive(Debug)]
pub struct RecordCache {
    capacity: usize,
    entries: BTreeMap<String, Arc<[AccidentRecord]>>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

impl RecordCache {
    /// Creates a cache holding at most `capacity` uploads. A capacity of
    /// zero disables caching.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: BTreeMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Number of cached uploads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the records for `bytes`, parsing them only on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns any [`LoadError`] from [`load_records`]. Errors are not
    /// cached, so a corrected re-upload is always re-parsed.
    pub fn get_or_load(&mut self, bytes: &[u8]) -> Result<Arc<[AccidentRecord]>, LoadError> {
        let key = fingerprint(bytes);

        if let Some(records) = self.entries.get(&key) {
            log::debug!("Record cache hit for {key}");
            return Ok(Arc::clone(records));
        }

        let records: Arc<[AccidentRecord]> = load_records(bytes)?.into();

        if self.capacity > 0 {
            while self.order.len() >= self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    log::debug!("Evicting {oldest} from record cache");
                    self.entries.remove(&oldest);
                }
            }
            self.entries.insert(key.clone(), Arc::clone(&records));
            self.order.push_back(key);
        }

        Ok(records)
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
