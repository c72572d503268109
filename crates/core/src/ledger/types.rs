//! Ledger domain types shared by the petty cash desk and the ledger collaborator.
//!
//! This module defines the chart of accounts, journals, partners and the
//! journal entries (moves) with their lines, as seen through the `Ledger` trait.

use chrono::NaiveDate;
use pettycash_shared::types::{
    AccountId, AnalyticDistribution, EntryId, JournalId, LineId, PartnerId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a chart of accounts entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Generic asset account.
    Asset,
    /// Cash or bank account.
    Cash,
    /// Customer receivable.
    Receivable,
    /// Vendor or employee payable.
    Payable,
    /// Expense account.
    Expense,
    /// Income account.
    Income,
    /// Equity account.
    Equity,
    /// Suspense (transit) account.
    Suspense,
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Account code, unique in the chart.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Whether lines on this account can be reconciled.
    pub reconcilable: bool,
}

/// Kind of journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalKind {
    /// Cash journal.
    Cash,
    /// Bank journal.
    Bank,
    /// Vendor bill journal.
    Purchase,
    /// Miscellaneous operations.
    General,
}

impl JournalKind {
    /// Returns true for journals that can fund or receive cash (bank or cash).
    #[must_use]
    pub fn is_liquidity(&self) -> bool {
        matches!(self, Self::Cash | Self::Bank)
    }
}

/// An accounting journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Unique identifier.
    pub id: JournalId,
    /// Short code, unique among journals.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Journal kind.
    pub kind: JournalKind,
    /// Default account of the journal (the cash account for liquidity journals).
    pub default_account: Option<AccountId>,
    /// Suspense account used for outstanding transfers.
    pub suspense_account: Option<AccountId>,
    /// Entries dated on or before this date cannot be posted.
    pub lock_date: Option<NaiveDate>,
}

/// A business partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    /// Unique identifier.
    pub id: PartnerId,
    /// Display name.
    pub name: String,
}

/// Kind of journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Plain journal entry.
    Entry,
    /// Vendor bill.
    VendorBill,
    /// Posted expense report.
    ExpenseSheet,
}

/// Posting state of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// Entry can still receive lines or be deleted.
    Draft,
    /// Entry is posted (immutable).
    Posted,
}

/// Header of a new journal entry.
#[derive(Debug, Clone)]
pub struct EntryHeader {
    /// Journal to record the entry in.
    pub journal: JournalId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Reference shown on the entry.
    pub reference: String,
    /// Free-text narration.
    pub narration: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Partner of the whole document, if any.
    pub partner: Option<PartnerId>,
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInput {
    /// The account to post to.
    pub account: AccountId,
    /// Partner the line is tagged with.
    pub partner: Option<PartnerId>,
    /// Analytic distribution of the line amount.
    pub analytic: AnalyticDistribution,
    /// Line label.
    pub label: String,
    /// Debit amount (0 if credit).
    pub debit: Decimal,
    /// Credit amount (0 if debit).
    pub credit: Decimal,
}

impl LineInput {
    /// Builds a debit line.
    #[must_use]
    pub fn debit(account: AccountId, amount: Decimal, label: impl Into<String>) -> Self {
        Self {
            account,
            partner: None,
            analytic: AnalyticDistribution::default(),
            label: label.into(),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    /// Builds a credit line.
    #[must_use]
    pub fn credit(account: AccountId, amount: Decimal, label: impl Into<String>) -> Self {
        Self {
            account,
            partner: None,
            analytic: AnalyticDistribution::default(),
            label: label.into(),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    /// Tags the line with a partner.
    #[must_use]
    pub fn with_partner(mut self, partner: Option<PartnerId>) -> Self {
        self.partner = partner;
        self
    }

    /// Tags the line with an analytic distribution.
    #[must_use]
    pub fn with_analytic(mut self, analytic: AnalyticDistribution) -> Self {
        self.analytic = analytic;
        self
    }
}

/// A journal line as stored by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier.
    pub id: LineId,
    /// Entry this line belongs to.
    pub entry: EntryId,
    /// Account posted to.
    pub account: AccountId,
    /// Partner the line is tagged with.
    pub partner: Option<PartnerId>,
    /// Analytic distribution.
    pub analytic: AnalyticDistribution,
    /// Line label.
    pub label: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Signed amount still open for reconciliation.
    pub residual: Decimal,
}

impl JournalLine {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Returns true once the whole line has been matched.
    #[must_use]
    pub fn is_fully_reconciled(&self) -> bool {
        self.residual.is_zero()
    }

    /// Returns true if some but not all of the line has been matched.
    #[must_use]
    pub fn is_partially_reconciled(&self) -> bool {
        !self.residual.is_zero() && self.residual != self.balance()
    }
}

/// A journal entry (move) with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// Journal the entry is recorded in.
    pub journal: JournalId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Reference.
    pub reference: String,
    /// Narration.
    pub narration: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Document partner.
    pub partner: Option<PartnerId>,
    /// Posting state.
    pub state: EntryState,
    /// Lines in insertion order.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Returns the debit/credit totals of the entry.
    #[must_use]
    pub fn totals(&self) -> TransactionTotals {
        TransactionTotals::new(
            self.lines.iter().map(|l| l.debit).sum(),
            self.lines.iter().map(|l| l.credit).sum(),
        )
    }

    /// Returns the lines posted to the given account.
    pub fn lines_on(&self, account: AccountId) -> impl Iterator<Item = &JournalLine> {
        self.lines.iter().filter(move |l| l.account == account)
    }

    /// Returns true once the entry is posted.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.state == EntryState::Posted
    }
}

/// A match between a debit and a credit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// The debit side.
    pub debit_line: LineId,
    /// The credit side.
    pub credit_line: LineId,
    /// Matched amount (always positive).
    pub amount: Decimal,
}

/// Entry totals for validation and display.
///
/// Contains the sum of debits and credits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the entry is balanced (debits == credits).
    pub is_balanced: bool,
}

impl TransactionTotals {
    /// Creates new totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}
