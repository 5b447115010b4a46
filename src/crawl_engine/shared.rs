//! State shared between concurrently running work units
//!
//! Each primitive guards exactly one thing and never holds its lock (if it
//! has one) across an `.await`.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::page_extractor::ProductRecord;

/// Monotonic source of asset folder numbers and synthesized identifiers.
///
/// `next()` is a single `fetch_add`, so N concurrent callers always receive
/// N distinct consecutive values.
#[derive(Debug, Default)]
pub struct FolderCounter {
    value: AtomicU64,
}

impl FolderCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next value, starting at 1
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last value handed out (0 before the first `next`)
    #[must_use]
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}

/// Cooperative cancellation flag.
///
/// Checked by the dispatch loop and at the start of each work unit. Work
/// already mid-extraction is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    stopped: Arc<AtomicBool>,
}

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Append-only list of finished records, in completion order
#[derive(Debug, Clone, Default)]
pub struct SharedResults {
    records: Arc<Mutex<Vec<ProductRecord>>>,
}

impl SharedResults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record and return the new length
    pub fn push(&self, record: ProductRecord) -> usize {
        let mut records = self.records.lock();
        records.push(record);
        records.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of everything appended so far
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProductRecord> {
        self.records.lock().clone()
    }
}
