//! Core business logic for the petty cash desk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Postings go through the `Ledger` trait; an in-memory ledger is provided.
//!
//! # Modules
//!
//! - `ledger` - Double-entry ledger contract, validation and in-memory books
//! - `petty_cash` - Request lifecycle, approval and payout
//! - `settlement` - Settlement claims and their reconciliation against the advance

pub mod ledger;
pub mod petty_cash;
pub mod settlement;

pub use ledger::{Ledger, LedgerError, MemoryLedger};
pub use petty_cash::{ErrorKind, PettyCashDesk, PettyCashError};
pub use settlement::{Settlement, SettlementEngine};
