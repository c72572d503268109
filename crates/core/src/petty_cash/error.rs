//! Petty cash error types.
//!
//! Failures fall into three families: operator-correctable preconditions
//! (`ErrorKind::User`), data-integrity violations detected before any ledger
//! call (`ErrorKind::Validation`), and failures reported by the ledger.

use pettycash_shared::types::{EntryId, RequestId, SettlementId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::petty_cash::types::RequestState;

/// Broad category of a [`PettyCashError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing data the operator can supply.
    User,
    /// The operation would break a data-integrity rule.
    Validation,
    /// Unknown request or settlement.
    NotFound,
    /// The ledger refused the operation.
    Ledger,
}

/// Errors that can occur during petty cash operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PettyCashError {
    // ========== User Errors ==========
    /// The request has no petty cash journal.
    #[error("Unknown Petty Cash Journal.")]
    MissingPettyCashJournal,

    /// The request has no narration.
    #[error("Add the narration of petty cash.")]
    MissingNarration,

    /// The request has no amount.
    #[error("Amount of petty cash must be added.")]
    MissingAmount,

    /// The request has no requester.
    #[error("Add the requester of petty cash.")]
    MissingRequester,

    /// The advance entry was already created.
    #[error("You have already created a journal entry.")]
    EntryAlreadyCreated,

    /// The advance entry does not exist yet.
    #[error("You should create an journal entry first.")]
    MissingEntry,

    /// Payout attempted without an operation journal.
    #[error("You should add operation journal.")]
    MissingOperationJournal,

    /// The advance has not been paid out yet.
    #[error("The petty cash of request {0} has not been paid yet.")]
    AdvanceNotPaid(String),

    /// Attempted an invalid state transition.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        /// The current state.
        from: RequestState,
        /// The attempted target state.
        to: RequestState,
    },

    // ========== Validation Errors ==========
    /// The requester still holds an advance that is not fully settled.
    #[error("{partner} has already petty cash isn't full reconciled")]
    UnreconciledRequest {
        /// Display name of the requester.
        partner: String,
    },

    /// Settlements would exceed the advance.
    #[error("You cannot settle a balance higher than the petty cash ({total} > {amount})")]
    SettlementExceedsAdvance {
        /// Settlement total after the change.
        total: Decimal,
        /// Advance amount.
        amount: Decimal,
    },

    /// A bare claim has no expense account.
    #[error("You should add expense account for any settlement line has not bill or expense ({settlement})")]
    MissingExpenseAccount {
        /// Settlement name.
        settlement: String,
    },

    /// The employee has no private address partner.
    #[error("Please! Add the private contact (Address) of {employee} from employee profile")]
    MissingHomeAddress {
        /// Employee name.
        employee: String,
    },

    /// The bill is already paid or partially paid.
    #[error("This bill is already reconciled or paid: {0}")]
    BillNotOpen(String),

    /// The expense sheet is not posted.
    #[error("This expense sheet is invalid to reconcile: {0}")]
    ExpenseSheetNotPosted(String),

    /// The claim entry has no open payable line.
    #[error("No payable line found on entry {0}")]
    PayableLineNotFound(EntryId),

    /// A journal lacks an account the operation needs.
    #[error("Journal {journal} has no {account} account")]
    JournalMissingAccount {
        /// Journal code.
        journal: String,
        /// Which account is missing ("default" or "suspense").
        account: &'static str,
    },

    /// Operation journals must be cash or bank journals other than the petty cash journal.
    #[error("Journal {0} cannot be used as operation journal")]
    InvalidOperationJournal(String),

    /// The referenced entry is not the expected kind of document.
    #[error("Entry {0} is not a {1}")]
    WrongDocumentKind(EntryId, &'static str),

    /// Amounts must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The open advance cannot fund the claims.
    #[error("Claims of {claimed} exceed the open petty cash of {open}, record the overage first")]
    AdvanceNotCovered {
        /// Total being drawn from the advance.
        claimed: Decimal,
        /// Open amount left on the advance lines.
        open: Decimal,
    },

    /// The same bill or expense sheet is claimed twice.
    #[error("{0} is claimed by more than one settlement")]
    DuplicateClaim(String),

    /// Adjustments and reconciled rows come only from return and overage.
    #[error("Settlement {0} is an adjustment and cannot be attached")]
    AdjustmentNotAttachable(String),

    /// Reconciled settlements are permanent.
    #[error("Settlement {0} is reconciled and cannot be removed")]
    SettlementReconciled(String),

    // ========== Lookup Errors ==========
    /// Request not found.
    #[error("Petty cash request {0} not found")]
    RequestNotFound(RequestId),

    /// Settlement not found on the request.
    #[error("Settlement {0} not found")]
    SettlementNotFound(SettlementId),

    // ========== Ledger Errors ==========
    /// Ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl PettyCashError {
    /// Returns the category of the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingPettyCashJournal
            | Self::MissingNarration
            | Self::MissingAmount
            | Self::MissingRequester
            | Self::EntryAlreadyCreated
            | Self::MissingEntry
            | Self::MissingOperationJournal
            | Self::AdvanceNotPaid(_)
            | Self::InvalidTransition { .. } => ErrorKind::User,

            Self::UnreconciledRequest { .. }
            | Self::SettlementExceedsAdvance { .. }
            | Self::MissingExpenseAccount { .. }
            | Self::MissingHomeAddress { .. }
            | Self::BillNotOpen(_)
            | Self::ExpenseSheetNotPosted(_)
            | Self::PayableLineNotFound(_)
            | Self::JournalMissingAccount { .. }
            | Self::InvalidOperationJournal(_)
            | Self::WrongDocumentKind(..)
            | Self::NonPositiveAmount(_)
            | Self::AdvanceNotCovered { .. }
            | Self::DuplicateClaim(_)
            | Self::AdjustmentNotAttachable(_)
            | Self::SettlementReconciled(_) => ErrorKind::Validation,

            Self::RequestNotFound(_) | Self::SettlementNotFound(_) => ErrorKind::NotFound,

            Self::Ledger(_) => ErrorKind::Ledger,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPettyCashJournal => "MISSING_PETTY_CASH_JOURNAL",
            Self::MissingNarration => "MISSING_NARRATION",
            Self::MissingAmount => "MISSING_AMOUNT",
            Self::MissingRequester => "MISSING_REQUESTER",
            Self::EntryAlreadyCreated => "ENTRY_ALREADY_CREATED",
            Self::MissingEntry => "MISSING_ENTRY",
            Self::MissingOperationJournal => "MISSING_OPERATION_JOURNAL",
            Self::AdvanceNotPaid(_) => "ADVANCE_NOT_PAID",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::UnreconciledRequest { .. } => "UNRECONCILED_REQUEST",
            Self::SettlementExceedsAdvance { .. } => "SETTLEMENT_EXCEEDS_ADVANCE",
            Self::MissingExpenseAccount { .. } => "MISSING_EXPENSE_ACCOUNT",
            Self::MissingHomeAddress { .. } => "MISSING_HOME_ADDRESS",
            Self::BillNotOpen(_) => "BILL_NOT_OPEN",
            Self::ExpenseSheetNotPosted(_) => "EXPENSE_SHEET_NOT_POSTED",
            Self::PayableLineNotFound(_) => "PAYABLE_LINE_NOT_FOUND",
            Self::JournalMissingAccount { .. } => "JOURNAL_MISSING_ACCOUNT",
            Self::InvalidOperationJournal(_) => "INVALID_OPERATION_JOURNAL",
            Self::WrongDocumentKind(..) => "WRONG_DOCUMENT_KIND",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::AdvanceNotCovered { .. } => "ADVANCE_NOT_COVERED",
            Self::DuplicateClaim(_) => "DUPLICATE_CLAIM",
            Self::AdjustmentNotAttachable(_) => "ADJUSTMENT_NOT_ATTACHABLE",
            Self::SettlementReconciled(_) => "SETTLEMENT_RECONCILED",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::SettlementNotFound(_) => "SETTLEMENT_NOT_FOUND",
            Self::Ledger(err) => err.error_code(),
        }
    }
}
