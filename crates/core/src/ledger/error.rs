//! Ledger error types for validation and state errors.
//!
//! This module defines the failures reported by the ledger collaborator:
//! lookups of unknown records, unbalanced or malformed entries, posting into
//! locked journals, and invalid reconciliations.

use chrono::NaiveDate;
use pettycash_shared::types::{AccountId, EntryId, JournalId, LineId, PartnerId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Entry must have at least 2 lines")]
    InsufficientEntries,

    /// Entry is not balanced (debits != credits).
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedTransaction {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Line amount cannot be zero.
    #[error("Line amount cannot be zero")]
    ZeroAmount,

    /// Line amount cannot be negative.
    #[error("Line amount cannot be negative")]
    NegativeAmount,

    /// Line must specify either debit or credit, not both.
    #[error("Line must specify either debit or credit, not both")]
    InvalidEntryType,

    // ========== Lookup Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    /// Partner not found.
    #[error("Partner not found: {0}")]
    PartnerNotFound(PartnerId),

    /// Entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Line not found.
    #[error("Journal line not found: {0}")]
    LineNotFound(LineId),

    // ========== Entry State Errors ==========
    /// Cannot modify a posted entry.
    #[error("Cannot modify posted entry {0}")]
    CannotModifyPosted(EntryId),

    /// Can only delete draft entries.
    #[error("Can only delete draft entries, {0} is posted")]
    CanOnlyDeleteDraft(EntryId),

    /// Entry must be posted before its lines can be reconciled.
    #[error("Entry {0} is not posted")]
    NotPosted(EntryId),

    /// The journal is locked for the entry date.
    #[error("Journal {journal} is locked until {lock_date}, cannot post on {date}")]
    JournalLocked {
        /// The journal.
        journal: JournalId,
        /// The journal lock date.
        lock_date: NaiveDate,
        /// The entry date.
        date: NaiveDate,
    },

    // ========== Reconciliation Errors ==========
    /// Lines to reconcile are on different accounts.
    #[error("Cannot reconcile lines on different accounts ({left} and {right})")]
    AccountMismatch {
        /// Account of the first line.
        left: AccountId,
        /// Account of the second line.
        right: AccountId,
    },

    /// Account does not allow reconciliation.
    #[error("Account {0} does not allow reconciliation")]
    AccountNotReconcilable(AccountId),

    /// Line is already fully reconciled.
    #[error("Line {0} is already fully reconciled")]
    AlreadyReconciled(LineId),

    /// Both lines are on the same side and cannot net to zero.
    #[error("Lines {left} and {right} are on the same side and cannot be matched")]
    SameSide {
        /// First line.
        left: LineId,
        /// Second line.
        right: LineId,
    },

    // ========== Transaction Errors ==========
    /// Commit or rollback without an open transaction.
    #[error("No ledger transaction is open")]
    NoOpenTransaction,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries => "INSUFFICIENT_ENTRIES",
            Self::UnbalancedTransaction { .. } => "UNBALANCED_TRANSACTION",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidEntryType => "INVALID_ENTRY_TYPE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::PartnerNotFound(_) => "PARTNER_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::LineNotFound(_) => "LINE_NOT_FOUND",
            Self::CannotModifyPosted(_) => "CANNOT_MODIFY_POSTED",
            Self::CanOnlyDeleteDraft(_) => "CAN_ONLY_DELETE_DRAFT",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::JournalLocked { .. } => "JOURNAL_LOCKED",
            Self::AccountMismatch { .. } => "ACCOUNT_MISMATCH",
            Self::AccountNotReconcilable(_) => "ACCOUNT_NOT_RECONCILABLE",
            Self::AlreadyReconciled(_) => "ALREADY_RECONCILED",
            Self::SameSide { .. } => "SAME_SIDE",
            Self::NoOpenTransaction => "NO_OPEN_TRANSACTION",
        }
    }

    /// Returns true for lookup failures.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_)
                | Self::JournalNotFound(_)
                | Self::PartnerNotFound(_)
                | Self::EntryNotFound(_)
                | Self::LineNotFound(_)
        )
    }
}
