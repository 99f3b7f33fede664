use std::sync::Arc;

use crate::types::PNode;

/// Holds the one live pnode set.
///
/// The set sits behind an `Arc<[PNode]>` and is swapped whole, so any
/// reader holding a handle keeps seeing the complete batch it grabbed.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[PNode]>,
    generation: u64,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            generation: 0,
        }
    }

    /// Swap in a new batch. The previous batch is dropped once the last
    /// outstanding handle to it goes away.
    pub fn replace(&mut self, records: Vec<PNode>) {
        self.records = Arc::from(records);
        self.generation += 1;
        log::debug!(
            "[store] replaced record set: {} pnodes (generation {})",
            self.records.len(),
            self.generation
        );
    }

    /// Shared handle to the present set
    pub fn current(&self) -> Arc<[PNode]> {
        Arc::clone(&self.records)
    }

    pub fn as_slice(&self) -> &[PNode] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of replacements since start
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
