//! Double-entry bookkeeping collaborator.
//!
//! This module implements the ledger the petty cash desk posts to:
//! - Domain types for accounts, journals, entries and lines
//! - Business rule validation
//! - The `Ledger` trait and transaction helpers
//! - Reversal of posted entries
//! - An in-memory implementation
//! - Error types for ledger operations

pub mod error;
pub mod memory;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use memory::{DocumentInput, MemoryLedger};
pub use reversal::{Reversal, ReversalService};
pub use service::{Ledger, in_transaction, record_entry};
pub use types::{
    Account, AccountType, EntryHeader, EntryKind, EntryState, Journal, JournalEntry, JournalKind,
    JournalLine, LineInput, Partner, Reconciliation, TransactionTotals,
};
pub use validation::{validate_line, validate_lines};
