//! In-memory ledger sink for testing

use crate::ledger::{LedgerResult, LedgerSink};
use crate::types::LedgerRecord;

/// In-memory ledger sink for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: Vec<LedgerRecord>,
}

impl MemoryLedger {
    /// Create a new memory ledger instance
    pub fn new() -> Self {
        Self::default()
    }

    /// All records appended so far, in insertion order
    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    /// Clear all data (useful for testing)
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl LedgerSink for MemoryLedger {
    fn append(&mut self, record: &LedgerRecord) -> LedgerResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
