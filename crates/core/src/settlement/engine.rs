//! Settlement reconciliation engine.
//!
//! Nets settlement claims against a paid petty cash advance.
//!
//! A claim backed by a bill or expense sheet goes through two bridge entries
//! in the petty cash journal:
//! - A: debit the claim's payable account (claim partner), credit the journal
//!   suspense account (requester). The debit is reconciled with the claim's
//!   payable line, which settles the bill or sheet.
//! - B: debit the suspense account, credit the petty cash account (both
//!   requester). The credit is reconciled with the advance lines.
//!
//! Bare claims have no payable leg: one entry debits each claim's expense
//! account and credits the petty cash account with the total, and that credit
//! is reconciled with the advance lines.
//!
//! Every claim of a batch is validated before the first posting.

use std::collections::HashSet;

use chrono::NaiveDate;
use pettycash_shared::types::{
    AccountId, AnalyticDistribution, EntryId, JournalId, LineId, PartnerId, SettlementId,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::ledger::{
    AccountType, EntryHeader, EntryKind, JournalEntry, JournalLine, Ledger, LedgerError,
    LineInput, record_entry,
};
use crate::petty_cash::error::PettyCashError;
use crate::settlement::types::{
    BillRef, ExpenseSheetRef, ExpenseSheetState, PaymentState, Settlement, SettlementSource,
};

/// Everything the engine needs to know about the advance being settled.
#[derive(Debug, Clone)]
pub struct AdvanceContext {
    /// Request name.
    pub name: String,
    /// Request narration.
    pub narration: String,
    /// Petty cash journal.
    pub petty_journal: JournalId,
    /// Default account of the petty cash journal.
    pub petty_account: AccountId,
    /// Suspense account of the petty cash journal.
    pub suspense_account: AccountId,
    /// Requester partner.
    pub requester: PartnerId,
    /// Analytic distribution copied onto every line.
    pub analytic: AnalyticDistribution,
    /// Open advance lines, matched in order.
    pub advance_lines: Vec<LineId>,
    /// Accounting date of the postings.
    pub date: NaiveDate,
}

impl AdvanceContext {
    /// Header of an entry in the petty cash journal.
    #[must_use]
    pub fn header(&self, reference: String, narration: String) -> EntryHeader {
        EntryHeader {
            journal: self.petty_journal,
            date: self.date,
            reference,
            narration,
            kind: EntryKind::Entry,
            partner: None,
        }
    }

    /// Debit line carrying the request's analytic distribution.
    #[must_use]
    pub fn debit(
        &self,
        account: AccountId,
        amount: Decimal,
        label: &str,
        partner: Option<PartnerId>,
    ) -> LineInput {
        LineInput::debit(account, amount, label)
            .with_partner(partner)
            .with_analytic(self.analytic.clone())
    }

    /// Credit line carrying the request's analytic distribution.
    #[must_use]
    pub fn credit(
        &self,
        account: AccountId,
        amount: Decimal,
        label: &str,
        partner: Option<PartnerId>,
    ) -> LineInput {
        LineInput::credit(account, amount, label)
            .with_partner(partner)
            .with_analytic(self.analytic.clone())
    }
}

/// Document behind a bridged claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    /// Vendor bill.
    Bill,
    /// Expense sheet.
    ExpenseSheet,
}

impl ClaimKind {
    fn document(self) -> &'static str {
        match self {
            Self::Bill => "bill",
            Self::ExpenseSheet => "expense sheet",
        }
    }
}

/// A bill or expense-sheet claim ready to be bridged.
#[derive(Debug, Clone)]
pub struct PreparedClaim {
    /// Settlement being processed.
    pub settlement: SettlementId,
    /// Document kind.
    pub kind: ClaimKind,
    /// Bill number or sheet name.
    pub claim_name: String,
    /// Partner owed by the claim.
    pub partner: Option<PartnerId>,
    /// Open payable line of the claim.
    pub payable_line: JournalLine,
    /// Settlement amount.
    pub amount: Decimal,
}

/// A bare claim ready to be booked.
#[derive(Debug, Clone)]
pub struct BareClaim {
    /// Settlement being processed.
    pub settlement: SettlementId,
    /// Settlement name, used as line label.
    pub name: String,
    /// Account debited.
    pub expense_account: AccountId,
    /// Settlement amount.
    pub amount: Decimal,
}

/// Unreconciled settlements partitioned into buckets, all validated.
#[derive(Debug, Clone, Default)]
pub struct SettlementPlan {
    /// Claims backed by posted expense sheets.
    pub expense_sheets: Vec<PreparedClaim>,
    /// Claims backed by unpaid bills.
    pub bills: Vec<PreparedClaim>,
    /// Bare claims.
    pub bare: Vec<BareClaim>,
}

impl SettlementPlan {
    /// Returns true when nothing is left to settle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expense_sheets.is_empty() && self.bills.is_empty() && self.bare.is_empty()
    }

    /// Total drawn from the advance by the whole plan.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.expense_sheets
            .iter()
            .chain(&self.bills)
            .map(|c| c.amount)
            .chain(self.bare.iter().map(|c| c.amount))
            .sum()
    }
}

/// Outcome of a settlement run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementReport {
    /// Entries posted, in order.
    pub entries: Vec<EntryId>,
    /// Settlements marked reconciled.
    pub reconciled: Vec<SettlementId>,
}

/// Stateless service generating the settlement postings.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Partitions the unreconciled settlements and validates every bucket.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; nothing is posted.
    pub fn plan<L: Ledger + ?Sized>(
        ledger: &L,
        settlements: &[Settlement],
    ) -> Result<SettlementPlan, PettyCashError> {
        let mut plan = SettlementPlan::default();
        let mut claimed = HashSet::new();

        for settlement in settlements.iter().filter(|s| !s.is_reconciled) {
            if settlement.amount <= Decimal::ZERO {
                return Err(PettyCashError::NonPositiveAmount(settlement.amount));
            }
            if let (Some(entry), Some(name)) = (settlement.claim_entry(), settlement.claim_name())
                && !claimed.insert(entry)
            {
                return Err(PettyCashError::DuplicateClaim(name.to_string()));
            }
            match &settlement.source {
                SettlementSource::ExpenseSheet(sheet) => {
                    plan.expense_sheets.push(Self::prepare_claim(
                        ledger,
                        ClaimKind::ExpenseSheet,
                        sheet.entry,
                        &sheet.name,
                        settlement,
                    )?);
                }
                SettlementSource::Bill(bill) => {
                    plan.bills.push(Self::prepare_claim(
                        ledger,
                        ClaimKind::Bill,
                        bill.entry,
                        &bill.name,
                        settlement,
                    )?);
                }
                SettlementSource::Bare { expense_account } => {
                    let Some(expense_account) = *expense_account else {
                        return Err(PettyCashError::MissingExpenseAccount {
                            settlement: settlement.name.clone(),
                        });
                    };
                    plan.bare.push(BareClaim {
                        settlement: settlement.id,
                        name: settlement.name.clone(),
                        expense_account,
                        amount: settlement.amount,
                    });
                }
                SettlementSource::Adjustment => {}
            }
        }

        Ok(plan)
    }

    fn prepare_claim<L: Ledger + ?Sized>(
        ledger: &L,
        kind: ClaimKind,
        entry: EntryId,
        claim_name: &str,
        settlement: &Settlement,
    ) -> Result<PreparedClaim, PettyCashError> {
        let not_open = || match kind {
            ClaimKind::Bill => PettyCashError::BillNotOpen(claim_name.to_string()),
            ClaimKind::ExpenseSheet => PettyCashError::ExpenseSheetNotPosted(claim_name.to_string()),
        };

        let entry = ledger.entry(entry)?;
        if !entry.is_posted() {
            return Err(not_open());
        }
        let payable_line = Self::payable_line(ledger, &entry)?;
        if payable_line.is_fully_reconciled() {
            return Err(not_open());
        }

        Ok(PreparedClaim {
            settlement: settlement.id,
            kind,
            claim_name: claim_name.to_string(),
            partner: payable_line.partner.or(entry.partner),
            payable_line,
            amount: settlement.amount,
        })
    }

    /// Returns the first payable credit line of a claim entry.
    ///
    /// # Errors
    ///
    /// Returns `PayableLineNotFound` when the entry has none.
    pub fn payable_line<L: Ledger + ?Sized>(
        ledger: &L,
        entry: &JournalEntry,
    ) -> Result<JournalLine, PettyCashError> {
        for line in entry.lines.iter().filter(|l| l.credit > Decimal::ZERO) {
            if ledger.account(line.account)?.account_type == AccountType::Payable {
                return Ok(line.clone());
            }
        }
        Err(PettyCashError::PayableLineNotFound(entry.id))
    }

    /// Reads a posted vendor bill from the ledger.
    ///
    /// # Errors
    ///
    /// Fails if the entry is not a vendor bill or has no payable line.
    pub fn bill_ref<L: Ledger + ?Sized>(
        ledger: &L,
        entry: EntryId,
    ) -> Result<BillRef, PettyCashError> {
        let entry = ledger.entry(entry)?;
        if entry.kind != EntryKind::VendorBill {
            return Err(PettyCashError::WrongDocumentKind(entry.id, "vendor bill"));
        }
        let payable = Self::payable_line(ledger, &entry)?;
        let payment_state = if payable.is_fully_reconciled() {
            PaymentState::Paid
        } else if payable.is_partially_reconciled() {
            PaymentState::Partial
        } else {
            PaymentState::NotPaid
        };

        Ok(BillRef {
            entry: entry.id,
            name: entry.reference.clone(),
            partner: payable.partner.or(entry.partner),
            amount_total: payable.credit,
            payment_state,
        })
    }

    /// Reads an expense sheet entry from the ledger.
    ///
    /// # Errors
    ///
    /// Fails if the entry is not an expense sheet or has no payable line.
    pub fn expense_sheet_ref<L: Ledger + ?Sized>(
        ledger: &L,
        entry: EntryId,
    ) -> Result<ExpenseSheetRef, PettyCashError> {
        let entry = ledger.entry(entry)?;
        if entry.kind != EntryKind::ExpenseSheet {
            return Err(PettyCashError::WrongDocumentKind(entry.id, "expense sheet"));
        }
        let payable = Self::payable_line(ledger, &entry)?;
        let state = if !entry.is_posted() {
            ExpenseSheetState::Approved
        } else if payable.is_fully_reconciled() {
            ExpenseSheetState::Done
        } else {
            ExpenseSheetState::Posted
        };

        Ok(ExpenseSheetRef {
            entry: entry.id,
            name: entry.reference.clone(),
            total_amount: payable.credit,
            state,
        })
    }

    /// Validates and settles every unreconciled settlement, marking each one
    /// reconciled as it is processed.
    ///
    /// Buckets run in order: expense sheets, bills, bare claims. The caller
    /// owns the transaction boundary.
    ///
    /// # Errors
    ///
    /// Validation failures are returned before any posting; ledger failures
    /// are returned as they happen.
    pub fn run<L: Ledger + ?Sized>(
        ledger: &mut L,
        ctx: &AdvanceContext,
        settlements: &mut [Settlement],
    ) -> Result<SettlementReport, PettyCashError> {
        let plan = Self::plan(ledger, settlements)?;
        let mut report = SettlementReport::default();
        if plan.is_empty() {
            return Ok(report);
        }
        let claimed = plan.total();
        let open = Self::open_advance(ledger, &ctx.advance_lines)?;
        if claimed > open {
            return Err(PettyCashError::AdvanceNotCovered { claimed, open });
        }

        for claim in plan.expense_sheets.iter().chain(&plan.bills) {
            let (bridge_a, bridge_b) = Self::settle_claim(ledger, ctx, claim)?;
            report.entries.extend([bridge_a, bridge_b]);
            report.reconciled.push(claim.settlement);
        }

        if !plan.bare.is_empty() {
            report.entries.push(Self::settle_bare(ledger, ctx, &plan.bare)?);
            report
                .reconciled
                .extend(plan.bare.iter().map(|c| c.settlement));
        }

        for settlement in settlements.iter_mut() {
            if report.reconciled.contains(&settlement.id) {
                settlement.is_reconciled = true;
            }
        }

        info!(
            request = %ctx.name,
            entries = report.entries.len(),
            settlements = report.reconciled.len(),
            "settlements confirmed"
        );
        Ok(report)
    }

    /// Posts both bridge entries for one claim and reconciles them.
    ///
    /// # Errors
    ///
    /// Returns the ledger failure of the first step that fails.
    pub fn settle_claim<L: Ledger + ?Sized>(
        ledger: &mut L,
        ctx: &AdvanceContext,
        claim: &PreparedClaim,
    ) -> Result<(EntryId, EntryId), PettyCashError> {
        let suspense_label = format!(
            "Reconcile the {} from ( {} )",
            claim.kind.document(),
            ctx.narration
        );
        let (bridge_a, lines_a) = record_entry(
            ledger,
            ctx.header(format!("Petty Cash [ {} ]", ctx.name), suspense_label.clone()),
            vec![
                ctx.debit(
                    claim.payable_line.account,
                    claim.amount,
                    &suspense_label,
                    claim.partner,
                ),
                ctx.credit(
                    ctx.suspense_account,
                    claim.amount,
                    &suspense_label,
                    Some(ctx.requester),
                ),
            ],
        )?;
        ledger.reconcile(lines_a[0], claim.payable_line.id)?;
        debug!(claim = %claim.claim_name, entry = %bridge_a, "claim payable bridged to suspense");

        let petty_label = format!(
            "Settlements of ({}) from ({})",
            ctx.narration, claim.claim_name
        );
        let (bridge_b, lines_b) = record_entry(
            ledger,
            ctx.header(format!("Settlements of {}", ctx.name), petty_label.clone()),
            vec![
                ctx.debit(
                    ctx.suspense_account,
                    claim.amount,
                    &petty_label,
                    Some(ctx.requester),
                ),
                ctx.credit(
                    ctx.petty_account,
                    claim.amount,
                    &petty_label,
                    Some(ctx.requester),
                ),
            ],
        )?;
        Self::draw_down(ledger, &ctx.advance_lines, lines_b[1])?;
        debug!(claim = %claim.claim_name, entry = %bridge_b, "suspense drawn against advance");

        Ok((bridge_a, bridge_b))
    }

    /// Books a batch of bare claims in one entry and reconciles its credit.
    ///
    /// # Errors
    ///
    /// Returns the ledger failure of the first step that fails.
    pub fn settle_bare<L: Ledger + ?Sized>(
        ledger: &mut L,
        ctx: &AdvanceContext,
        claims: &[BareClaim],
    ) -> Result<EntryId, PettyCashError> {
        let label = format!("Settlements of ( {} )", ctx.narration);
        let total: Decimal = claims.iter().map(|c| c.amount).sum();

        let mut lines: Vec<LineInput> = claims
            .iter()
            .map(|c| ctx.debit(c.expense_account, c.amount, &c.name, Some(ctx.requester)))
            .collect();
        lines.push(ctx.credit(ctx.petty_account, total, &label, Some(ctx.requester)));

        let (entry, line_ids) = record_entry(
            ledger,
            ctx.header(format!("Settlements of {}", ctx.name), label),
            lines,
        )?;
        if let Some(credit) = line_ids.last() {
            Self::draw_down(ledger, &ctx.advance_lines, *credit)?;
        }
        debug!(entry = %entry, claims = claims.len(), amount = %total, "bare claims booked");
        Ok(entry)
    }

    /// Open (unmatched) amount left on the advance lines.
    pub fn open_advance<L: Ledger + ?Sized>(
        ledger: &L,
        advance_lines: &[LineId],
    ) -> Result<Decimal, LedgerError> {
        let mut open = Decimal::ZERO;
        for advance in advance_lines {
            let residual = ledger.line(*advance)?.residual;
            if residual > Decimal::ZERO {
                open += residual;
            }
        }
        Ok(open)
    }

    /// Reconciles a petty cash credit with the open advance lines, in order,
    /// until the credit is fully matched. Returns the matched amount.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceNotCovered` when the advance lines cannot match the
    /// whole credit, or the ledger failure of a refused reconciliation.
    pub fn draw_down<L: Ledger + ?Sized>(
        ledger: &mut L,
        advance_lines: &[LineId],
        credit_line: LineId,
    ) -> Result<Decimal, PettyCashError> {
        let mut matched = Decimal::ZERO;
        for advance in advance_lines {
            if ledger.line(credit_line)?.is_fully_reconciled() {
                break;
            }
            if ledger.line(*advance)?.residual <= Decimal::ZERO {
                continue;
            }
            matched += ledger.reconcile(*advance, credit_line)?;
        }

        let credit = ledger.line(credit_line)?;
        if !credit.is_fully_reconciled() {
            return Err(PettyCashError::AdvanceNotCovered {
                claimed: credit.credit,
                open: matched,
            });
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DocumentInput, JournalKind, MemoryLedger};
    use rust_decimal_macros::dec;

    struct Books {
        ledger: MemoryLedger,
        ctx: AdvanceContext,
        purchase: JournalId,
        payable: AccountId,
        expense: AccountId,
        vendor: PartnerId,
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 15).unwrap()
    }

    /// Chart with a paid advance of `amount`.
    fn books(amount: Decimal) -> Books {
        let mut ledger = MemoryLedger::new();
        let petty = ledger.add_account("103000", "Petty Cash", AccountType::Cash, true);
        let suspense = ledger.add_account("103900", "Petty Cash Suspense", AccountType::Suspense, true);
        let bank = ledger.add_account("101000", "Bank", AccountType::Cash, false);
        let payable = ledger.add_account("211000", "Payables", AccountType::Payable, true);
        let expense = ledger.add_account("611000", "Office Expenses", AccountType::Expense, false);
        let petty_journal =
            ledger.add_journal("PTC", "Petty Cash", JournalKind::Cash, Some(petty), Some(suspense));
        let purchase = ledger.add_journal("BILL", "Vendor Bills", JournalKind::Purchase, None, None);
        let requester = ledger.add_partner("Mitchell Admin");
        let vendor = ledger.add_partner("Office Depot");

        let ctx = AdvanceContext {
            name: "PC/2026/00001".to_string(),
            narration: "Office run".to_string(),
            petty_journal,
            petty_account: petty,
            suspense_account: suspense,
            requester,
            analytic: AnalyticDistribution::default(),
            advance_lines: Vec::new(),
            date: today(),
        };
        let (_, lines) = record_entry(
            &mut ledger,
            ctx.header(ctx.name.clone(), ctx.narration.clone()),
            vec![
                ctx.debit(petty, amount, "Office run", Some(requester)),
                ctx.credit(bank, amount, "Office run", Some(requester)),
            ],
        )
        .unwrap();
        let ctx = AdvanceContext {
            advance_lines: vec![lines[0]],
            ..ctx
        };

        Books {
            ledger,
            ctx,
            purchase,
            payable,
            expense,
            vendor,
        }
    }

    fn bill(books: &mut Books, amount: Decimal) -> Settlement {
        let entry = books
            .ledger
            .record_document(DocumentInput {
                journal: books.purchase,
                kind: EntryKind::VendorBill,
                name: "BILL/2026/0001".to_string(),
                partner: books.vendor,
                date: today(),
                expense_account: books.expense,
                payable_account: books.payable,
                amount,
            })
            .unwrap();
        let bill = SettlementEngine::bill_ref(&books.ledger, entry).unwrap();
        Settlement::for_bill(bill).unwrap()
    }

    #[test]
    fn test_bill_claim_bridges_through_suspense() {
        let mut b = books(dec!(1000));
        let mut settlements = vec![bill(&mut b, dec!(400))];

        let report = SettlementEngine::run(&mut b.ledger, &b.ctx, &mut settlements).unwrap();

        assert_eq!(report.entries.len(), 2);
        assert!(settlements[0].is_reconciled);

        let bridge_a = b.ledger.entry(report.entries[0]).unwrap();
        assert_eq!(bridge_a.reference, "Petty Cash [ PC/2026/00001 ]");
        assert_eq!(bridge_a.narration, "Reconcile the bill from ( Office run )");
        assert_eq!(bridge_a.lines[0].partner, Some(b.vendor));
        assert_eq!(bridge_a.lines[1].partner, Some(b.ctx.requester));
        assert!(bridge_a.lines[0].is_fully_reconciled());

        let bridge_b = b.ledger.entry(report.entries[1]).unwrap();
        assert_eq!(bridge_b.reference, "Settlements of PC/2026/00001");
        assert_eq!(
            bridge_b.narration,
            "Settlements of (Office run) from (BILL/2026/0001)"
        );
        assert!(bridge_b.lines[1].is_fully_reconciled());

        assert_eq!(b.ledger.open_residual(b.payable), Decimal::ZERO);
        assert_eq!(b.ledger.account_balance(b.ctx.suspense_account), Decimal::ZERO);
        assert_eq!(b.ledger.account_balance(b.ctx.petty_account), dec!(600));
        let advance = b.ledger.line(b.ctx.advance_lines[0]).unwrap();
        assert_eq!(advance.residual, dec!(600));
    }

    #[test]
    fn test_bare_claims_share_one_entry() {
        let mut b = books(dec!(100));
        let mut settlements = vec![
            Settlement::bare("Taxi", dec!(30), Some(b.expense)),
            Settlement::bare("Coffee", dec!(20), Some(b.expense)),
        ];

        let report = SettlementEngine::run(&mut b.ledger, &b.ctx, &mut settlements).unwrap();

        assert_eq!(report.entries.len(), 1);
        let entry = b.ledger.entry(report.entries[0]).unwrap();
        assert_eq!(entry.lines.len(), 3);
        assert_eq!(entry.narration, "Settlements of ( Office run )");
        assert_eq!(entry.lines[2].credit, dec!(50));
        assert!(entry.lines[2].is_fully_reconciled());
        assert!(settlements.iter().all(|s| s.is_reconciled));
        assert_eq!(b.ledger.account_balance(b.expense), dec!(50));
    }

    #[test]
    fn test_bare_claim_without_account_posts_nothing() {
        let mut b = books(dec!(100));
        let before = b.ledger.entries().count();
        let mut settlements = vec![
            Settlement::bare("Taxi", dec!(30), Some(b.expense)),
            Settlement::bare("Mystery", dec!(20), None),
        ];

        let err = SettlementEngine::run(&mut b.ledger, &b.ctx, &mut settlements).unwrap_err();

        assert_eq!(
            err,
            PettyCashError::MissingExpenseAccount {
                settlement: "Mystery".to_string()
            }
        );
        assert_eq!(b.ledger.entries().count(), before);
        assert!(settlements.iter().all(|s| !s.is_reconciled));
    }

    #[test]
    fn test_paid_bill_rejected_before_posting() {
        let mut b = books(dec!(1000));
        let mut settlements = vec![bill(&mut b, dec!(400))];
        SettlementEngine::run(&mut b.ledger, &b.ctx, &mut settlements).unwrap();

        // the same bill again is now paid
        let mut again = settlements.clone();
        again[0].is_reconciled = false;
        let before = b.ledger.entries().count();
        assert_eq!(
            SettlementEngine::run(&mut b.ledger, &b.ctx, &mut again),
            Err(PettyCashError::BillNotOpen("BILL/2026/0001".to_string()))
        );
        assert_eq!(b.ledger.entries().count(), before);
    }

    #[test]
    fn test_reconciled_settlements_are_skipped() {
        let mut b = books(dec!(100));
        let mut settlements = vec![Settlement::adjustment("Return", dec!(10))];
        let report = SettlementEngine::run(&mut b.ledger, &b.ctx, &mut settlements).unwrap();
        assert_eq!(report, SettlementReport::default());
    }

    #[test]
    fn test_bill_ref_reads_payment_state() {
        let mut b = books(dec!(1000));
        let settlement = bill(&mut b, dec!(250));
        let entry = settlement.claim_entry().unwrap();
        let bill = SettlementEngine::bill_ref(&b.ledger, entry).unwrap();
        assert_eq!(bill.payment_state, PaymentState::NotPaid);
        assert_eq!(bill.amount_total, dec!(250));
        assert_eq!(bill.partner, Some(b.vendor));

        assert!(matches!(
            SettlementEngine::expense_sheet_ref(&b.ledger, entry),
            Err(PettyCashError::WrongDocumentKind(_, "expense sheet"))
        ));
    }

    #[test]
    fn test_draw_down_spans_advance_lines() {
        let mut b = books(dec!(50));
        // top-up line on the petty account
        let (_, top_up) = record_entry(
            &mut b.ledger,
            b.ctx.header("top-up".into(), "top-up".into()),
            vec![
                b.ctx.debit(b.ctx.petty_account, dec!(30), "top-up", None),
                b.ctx.credit(b.expense, dec!(30), "top-up", None),
            ],
        )
        .unwrap();
        b.ctx.advance_lines.push(top_up[0]);

        let mut settlements = vec![Settlement::bare("Hotel", dec!(70), Some(b.expense))];
        let report = SettlementEngine::run(&mut b.ledger, &b.ctx, &mut settlements).unwrap();

        let entry = b.ledger.entry(report.entries[0]).unwrap();
        assert!(entry.lines[1].is_fully_reconciled());
        assert!(b.ledger.line(b.ctx.advance_lines[0]).unwrap().is_fully_reconciled());
        assert_eq!(b.ledger.line(top_up[0]).unwrap().residual, dec!(10));
    }

    #[test]
    fn test_same_bill_twice_rejected_before_posting() {
        let mut b = books(dec!(1000));
        let first = bill(&mut b, dec!(100));
        let mut second = first.clone();
        second.id = SettlementId::new();
        let mut settlements = vec![first, second];
        let before = b.ledger.entries().count();

        let err = SettlementEngine::run(&mut b.ledger, &b.ctx, &mut settlements).unwrap_err();

        assert_eq!(err, PettyCashError::DuplicateClaim("BILL/2026/0001".to_string()));
        assert_eq!(b.ledger.entries().count(), before);
    }

    #[test]
    fn test_claims_beyond_open_advance_rejected_before_posting() {
        let mut b = books(dec!(300));
        let mut settlements = vec![
            bill(&mut b, dec!(250)),
            Settlement::bare("Taxi", dec!(100), Some(b.expense)),
        ];
        let before = b.ledger.entries().count();

        let err = SettlementEngine::run(&mut b.ledger, &b.ctx, &mut settlements).unwrap_err();

        assert_eq!(
            err,
            PettyCashError::AdvanceNotCovered {
                claimed: dec!(350),
                open: dec!(300),
            }
        );
        assert_eq!(b.ledger.entries().count(), before);
        assert!(settlements.iter().all(|s| !s.is_reconciled));
    }

    #[test]
    fn test_draw_down_fails_when_advance_runs_out() {
        let mut b = books(dec!(20));
        let (_, lines) = record_entry(
            &mut b.ledger,
            b.ctx.header("spend".into(), "spend".into()),
            vec![
                b.ctx.debit(b.expense, dec!(50), "spend", None),
                b.ctx.credit(b.ctx.petty_account, dec!(50), "spend", None),
            ],
        )
        .unwrap();

        let err = SettlementEngine::draw_down(&mut b.ledger, &b.ctx.advance_lines, lines[1])
            .unwrap_err();

        assert_eq!(
            err,
            PettyCashError::AdvanceNotCovered {
                claimed: dec!(50),
                open: dec!(20),
            }
        );
        assert_eq!(
            SettlementEngine::open_advance(&b.ledger, &b.ctx.advance_lines),
            Ok(Decimal::ZERO)
        );
    }
}
