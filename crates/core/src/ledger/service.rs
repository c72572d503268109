//! The ledger collaborator contract.
//!
//! The petty cash desk never posts to a database directly. It talks to a
//! double-entry ledger through this trait: creating entries, appending lines,
//! posting, reconciling matched lines and reading the chart of accounts.

use pettycash_shared::types::{AccountId, EntryId, JournalId, LineId, PartnerId};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{
    Account, EntryHeader, JournalEntry, JournalKind, JournalLine, LineInput, Partner, Journal,
};

/// A double-entry ledger able to record, post and reconcile journal entries.
pub trait Ledger {
    /// Creates an empty draft entry.
    fn create_entry(&mut self, header: EntryHeader) -> Result<EntryId, LedgerError>;

    /// Appends lines to a draft entry, returning the new line ids in order.
    fn add_lines(
        &mut self,
        entry: EntryId,
        lines: Vec<LineInput>,
    ) -> Result<Vec<LineId>, LedgerError>;

    /// Posts a draft entry. Fails if unbalanced or the journal is locked.
    fn post(&mut self, entry: EntryId) -> Result<(), LedgerError>;

    /// Matches two lines on the same account, returning the matched amount.
    ///
    /// Partial matches are allowed: the smaller open amount is matched and
    /// both residuals shrink by it.
    fn reconcile(&mut self, left: LineId, right: LineId) -> Result<Decimal, LedgerError>;

    /// Deletes a draft entry.
    fn delete_entry(&mut self, entry: EntryId) -> Result<(), LedgerError>;

    /// Opens a transaction boundary.
    fn begin(&mut self);

    /// Makes every change since the matching `begin` permanent.
    fn commit(&mut self) -> Result<(), LedgerError>;

    /// Discards every change since the matching `begin`.
    fn rollback(&mut self) -> Result<(), LedgerError>;

    /// Looks up an entry with its lines.
    fn entry(&self, id: EntryId) -> Result<JournalEntry, LedgerError>;

    /// Looks up a single line.
    fn line(&self, id: LineId) -> Result<JournalLine, LedgerError>;

    /// Looks up an account.
    fn account(&self, id: AccountId) -> Result<Account, LedgerError>;

    /// Finds an account by code.
    fn account_by_code(&self, code: &str) -> Option<Account>;

    /// Looks up a journal.
    fn journal(&self, id: JournalId) -> Result<Journal, LedgerError>;

    /// Finds a journal by code.
    fn journal_by_code(&self, code: &str) -> Option<Journal>;

    /// Lists the journals of the given kinds.
    fn journals_of_kind(&self, kinds: &[JournalKind]) -> Vec<Journal>;

    /// Looks up a partner.
    fn partner(&self, id: PartnerId) -> Result<Partner, LedgerError>;

    /// Finds a partner by name.
    fn partner_by_name(&self, name: &str) -> Option<Partner>;
}

/// Creates, fills and posts an entry in one step, returning the entry id and
/// its line ids.
pub fn record_entry<L: Ledger + ?Sized>(
    ledger: &mut L,
    header: EntryHeader,
    lines: Vec<LineInput>,
) -> Result<(EntryId, Vec<LineId>), LedgerError> {
    let entry = ledger.create_entry(header)?;
    let line_ids = ledger.add_lines(entry, lines)?;
    ledger.post(entry)?;
    Ok((entry, line_ids))
}

/// Runs `work` inside a ledger transaction.
///
/// The transaction is committed when `work` succeeds and rolled back when it
/// fails, so a failing operation leaves no partial postings behind.
pub fn in_transaction<L, T, E, F>(ledger: &mut L, work: F) -> Result<T, E>
where
    L: Ledger + ?Sized,
    E: From<LedgerError>,
    F: FnOnce(&mut L) -> Result<T, E>,
{
    ledger.begin();
    match work(ledger) {
        Ok(value) => {
            ledger.commit()?;
            Ok(value)
        }
        Err(err) => {
            ledger.rollback()?;
            Err(err)
        }
    }
}
