//! First-seen-wins deduplication of area results by `place_id`.

use std::collections::HashSet;

use placegrid_core::BusinessRecord;

/// Counts for one merged batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub new: usize,
    pub duplicates: usize,
}

/// Accumulates unique records across batches. Owned by a single merge loop.
#[derive(Debug, Default)]
pub struct ResultMerger {
    seen: HashSet<String>,
    records: Vec<BusinessRecord>,
}

impl ResultMerger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every record whose `place_id` has not been seen yet. Later
    /// copies of a known id are counted and discarded, including repeats
    /// inside the same batch.
    pub fn merge(&mut self, batch: Vec<BusinessRecord>) -> MergeStats {
        let mut stats = MergeStats::default();
        for record in batch {
            if self.seen.insert(record.place_id.clone()) {
                self.records.push(record);
                stats.new += 1;
            } else {
                stats.duplicates += 1;
            }
        }
        stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<BusinessRecord> {
        self.records
    }
}
