//! CSV file ledger

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::ledger::{LedgerResult, LedgerSink};
use crate::types::LedgerRecord;

/// Append-only CSV ledger file
///
/// The file is created on the first append. The header row is written only
/// when the file is empty, so rows keep accumulating under one header
/// across process restarts. Every append flushes and syncs the file before
/// returning; a row reported as appended survives a crash.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    /// Create a ledger backed by the CSV file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerSink for CsvLedger {
    #[instrument(skip(self, record), fields(path = %self.path.display(), party = %record.party))]
    fn append(&mut self, record: &LedgerRecord) -> LedgerResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        // the writer borrows the file; drop it before syncing
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(needs_header)
                .from_writer(&mut file);
            writer.serialize(record)?;
            writer.flush()?;
        }
        file.sync_all()?;

        info!(wrote_header = needs_header, "appended ledger row");
        Ok(())
    }
}
