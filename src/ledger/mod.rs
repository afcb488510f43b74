//! Append-only sales ledger
//!
//! Every finalized invoice is flattened into one [`LedgerRecord`] row and
//! appended to a running table. The sink trait is the seam between
//! invoice generation and storage: production appends to the CSV file
//! ledger, tests capture rows in memory.

pub mod csv_sink;

pub use csv_sink::*;

use thiserror::Error;

use crate::types::LedgerRecord;

/// Errors that can occur while appending to the ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("failed to access ledger file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write ledger row: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Destination for finalized invoice rows
///
/// Appends are terminal: a row handed to a sink is never updated or
/// removed through this interface.
pub trait LedgerSink {
    /// Append one invoice row
    fn append(&mut self, record: &LedgerRecord) -> LedgerResult<()>;
}
