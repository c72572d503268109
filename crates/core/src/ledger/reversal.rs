//! Reversal of posted entries.
//!
//! A posted entry is never edited. It is cancelled by posting a mirror entry
//! with debits and credits swapped, after which each original line can be
//! reconciled against its mirror.

use chrono::NaiveDate;
use pettycash_shared::types::{EntryId, LineId};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::service::{Ledger, record_entry};
use super::types::{EntryHeader, JournalEntry, JournalLine, LineInput};

/// Result of reversing a posted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversal {
    /// The mirror entry.
    pub entry: EntryId,
    /// Pairs of (original line, mirror line) in original order.
    pub pairs: Vec<(LineId, LineId)>,
}

/// Stateless service for creating reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the mirror lines of an entry.
    ///
    /// For each original line:
    /// - Debits become credits
    /// - Credits become debits
    /// - Account, partner and analytic are preserved
    /// - Label is prefixed with "Reversal: "
    #[must_use]
    pub fn reversing_lines(entry: &JournalEntry) -> Vec<LineInput> {
        entry
            .lines
            .iter()
            .map(|line| LineInput {
                account: line.account,
                partner: line.partner,
                analytic: line.analytic.clone(),
                label: format!("Reversal: {}", line.label),
                debit: line.credit,
                credit: line.debit,
            })
            .collect()
    }

    /// Returns true if the lines are balanced.
    ///
    /// This should always be true for posted entries.
    #[must_use]
    pub fn validate_reversal(lines: &[JournalLine]) -> bool {
        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();

        total_debit == total_credit
    }

    /// Posts the mirror of a posted entry on `date`.
    ///
    /// # Errors
    ///
    /// Fails if the entry is unknown or not posted, or if the mirror cannot
    /// be posted (for example when its journal is locked).
    pub fn reverse<L: Ledger + ?Sized>(
        ledger: &mut L,
        entry: EntryId,
        date: NaiveDate,
    ) -> Result<Reversal, LedgerError> {
        let original = ledger.entry(entry)?;
        if !original.is_posted() {
            return Err(LedgerError::NotPosted(entry));
        }
        let totals = original.totals();
        if !Self::validate_reversal(&original.lines) {
            return Err(LedgerError::UnbalancedTransaction {
                debit: totals.debit,
                credit: totals.credit,
            });
        }

        let header = EntryHeader {
            journal: original.journal,
            date,
            reference: format!("Reversal of {}", original.reference),
            narration: original.narration.clone(),
            kind: original.kind,
            partner: original.partner,
        };
        let (mirror, line_ids) = record_entry(ledger, header, Self::reversing_lines(&original))?;

        Ok(Reversal {
            entry: mirror,
            pairs: original.lines.iter().map(|l| l.id).zip(line_ids).collect(),
        })
    }
}
