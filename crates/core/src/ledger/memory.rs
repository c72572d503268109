//! In-memory ledger.
//!
//! Reference implementation of the `Ledger` trait used by tests and by the
//! demo binary. It enforces the same rules a database-backed ledger would:
//! balanced posting, journal lock dates, same-account reconciliation and
//! snapshot-based transactions.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use pettycash_shared::types::{AccountId, EntryId, JournalId, LineId, PartnerId};
use rust_decimal::Decimal;
use tracing::debug;

use super::error::LedgerError;
use super::service::{Ledger, record_entry};
use super::types::{
    Account, AccountType, EntryHeader, EntryKind, EntryState, Journal, JournalEntry, JournalKind,
    JournalLine, LineInput, Partner, Reconciliation,
};
use super::validation::validate_line;

#[derive(Debug, Clone, Default)]
struct Books {
    accounts: BTreeMap<AccountId, Account>,
    journals: BTreeMap<JournalId, Journal>,
    partners: BTreeMap<PartnerId, Partner>,
    entries: HashMap<EntryId, JournalEntry>,
    entry_order: Vec<EntryId>,
    line_index: HashMap<LineId, EntryId>,
    reconciliations: Vec<Reconciliation>,
}

/// A vendor bill or expense report recorded directly in the ledger.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Journal of the document.
    pub journal: JournalId,
    /// `VendorBill` or `ExpenseSheet`.
    pub kind: EntryKind,
    /// Document number, used as the entry reference.
    pub name: String,
    /// Vendor or employee owed the amount.
    pub partner: PartnerId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Account debited with the cost.
    pub expense_account: AccountId,
    /// Payable account credited.
    pub payable_account: AccountId,
    /// Document total.
    pub amount: Decimal,
}

/// Ledger kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    books: Books,
    snapshots: Vec<Books>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account to the chart.
    pub fn add_account(
        &mut self,
        code: &str,
        name: &str,
        account_type: AccountType,
        reconcilable: bool,
    ) -> AccountId {
        let id = AccountId::new();
        self.books.accounts.insert(
            id,
            Account {
                id,
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                reconcilable,
            },
        );
        id
    }

    /// Adds a journal.
    pub fn add_journal(
        &mut self,
        code: &str,
        name: &str,
        kind: JournalKind,
        default_account: Option<AccountId>,
        suspense_account: Option<AccountId>,
    ) -> JournalId {
        let id = JournalId::new();
        self.books.journals.insert(
            id,
            Journal {
                id,
                code: code.to_string(),
                name: name.to_string(),
                kind,
                default_account,
                suspense_account,
                lock_date: None,
            },
        );
        id
    }

    /// Locks a journal up to and including `date`.
    pub fn set_lock_date(&mut self, journal: JournalId, date: NaiveDate) -> Result<(), LedgerError> {
        let journal = self
            .books
            .journals
            .get_mut(&journal)
            .ok_or(LedgerError::JournalNotFound(journal))?;
        journal.lock_date = Some(date);
        Ok(())
    }

    /// Adds a partner.
    pub fn add_partner(&mut self, name: &str) -> PartnerId {
        let id = PartnerId::new();
        self.books.partners.insert(
            id,
            Partner {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    /// Records and posts a vendor bill or expense report: cost debited to the
    /// expense account, total credited to the payable account.
    pub fn record_document(&mut self, doc: DocumentInput) -> Result<EntryId, LedgerError> {
        let header = EntryHeader {
            journal: doc.journal,
            date: doc.date,
            reference: doc.name.clone(),
            narration: doc.name.clone(),
            kind: doc.kind,
            partner: Some(doc.partner),
        };
        let lines = vec![
            LineInput::debit(doc.expense_account, doc.amount, doc.name.as_str())
                .with_partner(Some(doc.partner)),
            LineInput::credit(doc.payable_account, doc.amount, doc.name.as_str())
                .with_partner(Some(doc.partner)),
        ];
        let (entry, _) = record_entry(self, header, lines)?;
        Ok(entry)
    }

    /// Iterates over entries in creation order.
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.books
            .entry_order
            .iter()
            .filter_map(|id| self.books.entries.get(id))
    }

    /// Returns every reconciliation performed so far.
    #[must_use]
    pub fn reconciliations(&self) -> &[Reconciliation] {
        &self.books.reconciliations
    }

    /// Returns the posted balance (debit - credit) of an account.
    #[must_use]
    pub fn account_balance(&self, account: AccountId) -> Decimal {
        self.entries()
            .filter(|e| e.is_posted())
            .flat_map(|e| e.lines_on(account))
            .map(JournalLine::balance)
            .sum()
    }

    /// Returns the open (unreconciled) amount of an account's posted lines.
    #[must_use]
    pub fn open_residual(&self, account: AccountId) -> Decimal {
        self.entries()
            .filter(|e| e.is_posted())
            .flat_map(|e| e.lines_on(account))
            .map(|l| l.residual)
            .sum()
    }

    fn line_mut(&mut self, id: LineId) -> Result<&mut JournalLine, LedgerError> {
        let entry = self
            .books
            .line_index
            .get(&id)
            .ok_or(LedgerError::LineNotFound(id))?;
        self.books
            .entries
            .get_mut(entry)
            .and_then(|e| e.lines.iter_mut().find(|l| l.id == id))
            .ok_or(LedgerError::LineNotFound(id))
    }

    fn ensure_partner(&self, partner: Option<PartnerId>) -> Result<(), LedgerError> {
        match partner {
            Some(id) if !self.books.partners.contains_key(&id) => {
                Err(LedgerError::PartnerNotFound(id))
            }
            _ => Ok(()),
        }
    }
}

impl Ledger for MemoryLedger {
    fn create_entry(&mut self, header: EntryHeader) -> Result<EntryId, LedgerError> {
        if !self.books.journals.contains_key(&header.journal) {
            return Err(LedgerError::JournalNotFound(header.journal));
        }
        self.ensure_partner(header.partner)?;

        let id = EntryId::new();
        self.books.entries.insert(
            id,
            JournalEntry {
                id,
                journal: header.journal,
                date: header.date,
                reference: header.reference,
                narration: header.narration,
                kind: header.kind,
                partner: header.partner,
                state: EntryState::Draft,
                lines: Vec::new(),
            },
        );
        self.books.entry_order.push(id);
        debug!(entry = %id, "created journal entry");
        Ok(id)
    }

    fn add_lines(
        &mut self,
        entry: EntryId,
        lines: Vec<LineInput>,
    ) -> Result<Vec<LineId>, LedgerError> {
        let state = self
            .books
            .entries
            .get(&entry)
            .map(|e| e.state)
            .ok_or(LedgerError::EntryNotFound(entry))?;
        if state == EntryState::Posted {
            return Err(LedgerError::CannotModifyPosted(entry));
        }

        for line in &lines {
            validate_line(line)?;
            if !self.books.accounts.contains_key(&line.account) {
                return Err(LedgerError::AccountNotFound(line.account));
            }
            self.ensure_partner(line.partner)?;
        }

        let mut ids = Vec::with_capacity(lines.len());
        let mut stored = Vec::with_capacity(lines.len());
        for line in lines {
            let id = LineId::new();
            stored.push(JournalLine {
                id,
                entry,
                account: line.account,
                partner: line.partner,
                analytic: line.analytic,
                label: line.label,
                debit: line.debit,
                credit: line.credit,
                residual: line.debit - line.credit,
            });
            self.books.line_index.insert(id, entry);
            ids.push(id);
        }
        if let Some(e) = self.books.entries.get_mut(&entry) {
            e.lines.extend(stored);
        }
        Ok(ids)
    }

    fn post(&mut self, entry: EntryId) -> Result<(), LedgerError> {
        let record = self
            .books
            .entries
            .get(&entry)
            .ok_or(LedgerError::EntryNotFound(entry))?;
        if record.is_posted() {
            return Err(LedgerError::CannotModifyPosted(entry));
        }
        if record.lines.len() < 2 {
            return Err(LedgerError::InsufficientEntries);
        }
        let totals = record.totals();
        if !totals.is_balanced {
            return Err(LedgerError::UnbalancedTransaction {
                debit: totals.debit,
                credit: totals.credit,
            });
        }
        let journal = self
            .books
            .journals
            .get(&record.journal)
            .ok_or(LedgerError::JournalNotFound(record.journal))?;
        if let Some(lock_date) = journal.lock_date {
            if record.date <= lock_date {
                return Err(LedgerError::JournalLocked {
                    journal: journal.id,
                    lock_date,
                    date: record.date,
                });
            }
        }

        if let Some(e) = self.books.entries.get_mut(&entry) {
            e.state = EntryState::Posted;
        }
        debug!(entry = %entry, amount = %totals.debit, "posted journal entry");
        Ok(())
    }

    fn reconcile(&mut self, left: LineId, right: LineId) -> Result<Decimal, LedgerError> {
        let a = self.line(left)?;
        let b = self.line(right)?;

        for line in [&a, &b] {
            let entry = self.entry(line.entry)?;
            if !entry.is_posted() {
                return Err(LedgerError::NotPosted(entry.id));
            }
        }
        if a.account != b.account {
            return Err(LedgerError::AccountMismatch {
                left: a.account,
                right: b.account,
            });
        }
        if !self.account(a.account)?.reconcilable {
            return Err(LedgerError::AccountNotReconcilable(a.account));
        }
        for line in [&a, &b] {
            if line.is_fully_reconciled() {
                return Err(LedgerError::AlreadyReconciled(line.id));
            }
        }
        if a.residual.is_sign_positive() == b.residual.is_sign_positive() {
            return Err(LedgerError::SameSide { left, right });
        }

        let matched = a.residual.abs().min(b.residual.abs());
        let (debit_line, credit_line) = if a.residual.is_sign_positive() {
            (left, right)
        } else {
            (right, left)
        };
        self.line_mut(debit_line)?.residual -= matched;
        self.line_mut(credit_line)?.residual += matched;
        self.books.reconciliations.push(Reconciliation {
            debit_line,
            credit_line,
            amount: matched,
        });
        debug!(%debit_line, %credit_line, amount = %matched, "reconciled lines");
        Ok(matched)
    }

    fn delete_entry(&mut self, entry: EntryId) -> Result<(), LedgerError> {
        let record = self
            .books
            .entries
            .get(&entry)
            .ok_or(LedgerError::EntryNotFound(entry))?;
        if record.is_posted() {
            return Err(LedgerError::CanOnlyDeleteDraft(entry));
        }
        if let Some(removed) = self.books.entries.remove(&entry) {
            for line in removed.lines {
                self.books.line_index.remove(&line.id);
            }
        }
        self.books.entry_order.retain(|id| *id != entry);
        debug!(entry = %entry, "deleted draft journal entry");
        Ok(())
    }

    fn begin(&mut self) {
        self.snapshots.push(self.books.clone());
    }

    fn commit(&mut self) -> Result<(), LedgerError> {
        self.snapshots
            .pop()
            .map(|_| ())
            .ok_or(LedgerError::NoOpenTransaction)
    }

    fn rollback(&mut self) -> Result<(), LedgerError> {
        let snapshot = self.snapshots.pop().ok_or(LedgerError::NoOpenTransaction)?;
        self.books = snapshot;
        debug!("rolled back ledger transaction");
        Ok(())
    }

    fn entry(&self, id: EntryId) -> Result<JournalEntry, LedgerError> {
        self.books
            .entries
            .get(&id)
            .cloned()
            .ok_or(LedgerError::EntryNotFound(id))
    }

    fn line(&self, id: LineId) -> Result<JournalLine, LedgerError> {
        self.books
            .line_index
            .get(&id)
            .and_then(|entry| self.books.entries.get(entry))
            .and_then(|e| e.lines.iter().find(|l| l.id == id))
            .cloned()
            .ok_or(LedgerError::LineNotFound(id))
    }

    fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.books
            .accounts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))
    }

    fn account_by_code(&self, code: &str) -> Option<Account> {
        self.books.accounts.values().find(|a| a.code == code).cloned()
    }

    fn journal(&self, id: JournalId) -> Result<Journal, LedgerError> {
        self.books
            .journals
            .get(&id)
            .cloned()
            .ok_or(LedgerError::JournalNotFound(id))
    }

    fn journal_by_code(&self, code: &str) -> Option<Journal> {
        self.books.journals.values().find(|j| j.code == code).cloned()
    }

    fn journals_of_kind(&self, kinds: &[JournalKind]) -> Vec<Journal> {
        self.books
            .journals
            .values()
            .filter(|j| kinds.contains(&j.kind))
            .cloned()
            .collect()
    }

    fn partner(&self, id: PartnerId) -> Result<Partner, LedgerError> {
        self.books
            .partners
            .get(&id)
            .cloned()
            .ok_or(LedgerError::PartnerNotFound(id))
    }

    fn partner_by_name(&self, name: &str) -> Option<Partner> {
        self.books.partners.values().find(|p| p.name == name).cloned()
    }
}
