//! Petty cash desk.
//!
//! Owns the request book and drives every request through its lifecycle,
//! posting to the ledger it was built with. Each operation that posts runs
//! inside one ledger transaction, and the request is only updated once that
//! transaction has committed.
//!
//! Mutating operations take `&mut self`, so approvals for the same requester
//! are serialized and the open-advance check cannot race.

use chrono::{NaiveDate, Utc};
use pettycash_shared::PettyCashConfig;
use pettycash_shared::types::{AccountId, EntryId, JournalId, PartnerId, RequestId, SettlementId};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::ledger::{
    EntryHeader, EntryKind, Journal, JournalLine, Ledger, LedgerError, LineInput,
    ReversalService, in_transaction, record_entry,
};
use crate::petty_cash::error::PettyCashError;
use crate::petty_cash::lifecycle::RequestLifecycle;
use crate::petty_cash::sequence::{PLACEHOLDER_NAME, RequestSequence};
use crate::petty_cash::types::{
    Employee, NewRequest, OperationSuggestion, PettyCashRequest, RequestState, Requester,
};
use crate::settlement::{
    AdvanceContext, Settlement, SettlementEngine, SettlementReport, SettlementSource,
};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn default_account(journal: &Journal) -> Result<AccountId, PettyCashError> {
    journal
        .default_account
        .ok_or_else(|| PettyCashError::JournalMissingAccount {
            journal: journal.code.clone(),
            account: "default",
        })
}

/// Tags a line with the request's requester and analytic distribution.
fn tag(request: &PettyCashRequest, line: LineInput) -> LineInput {
    line.with_partner(request.requester_partner())
        .with_analytic(request.analytic_distribution.clone())
}

/// Deletes a draft advance, or reverses a posted one and matches each
/// original line with its mirror. Returns the reversing entry.
fn cancel_advance<L: Ledger + ?Sized>(
    ledger: &mut L,
    entry: EntryId,
    date: NaiveDate,
) -> Result<Option<EntryId>, PettyCashError> {
    if !ledger.entry(entry)?.is_posted() {
        ledger.delete_entry(entry)?;
        return Ok(None);
    }

    let reversal = ReversalService::reverse(ledger, entry, date)?;
    for (original, mirror) in &reversal.pairs {
        let line = ledger.line(*original)?;
        if line.is_fully_reconciled() || !ledger.account(line.account)?.reconcilable {
            continue;
        }
        ledger.reconcile(*original, *mirror)?;
    }
    Ok(Some(reversal.entry))
}

/// Petty cash request book over a ledger.
#[derive(Debug)]
pub struct PettyCashDesk<L: Ledger> {
    ledger: L,
    requests: Vec<PettyCashRequest>,
    sequence: RequestSequence,
    petty_cash_journal: Option<JournalId>,
    suspense_account: Option<AccountId>,
}

impl<L: Ledger> PettyCashDesk<L> {
    /// Creates a desk, resolving the configured journal and suspense account
    /// codes against the ledger.
    pub fn new(ledger: L, config: &PettyCashConfig) -> Self {
        let petty_cash_journal = ledger.journal_by_code(&config.journal_code).map(|j| j.id);
        if petty_cash_journal.is_none() {
            warn!(code = %config.journal_code, "petty cash journal not found");
        }
        let suspense_account = ledger
            .account_by_code(&config.suspense_account_code)
            .map(|a| a.id);
        if suspense_account.is_none() {
            warn!(code = %config.suspense_account_code, "company suspense account not found");
        }

        Self {
            ledger,
            requests: Vec::new(),
            sequence: RequestSequence::new(&config.sequence),
            petty_cash_journal,
            suspense_account,
        }
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the underlying ledger, e.g. to record bills.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Consumes the desk, returning the ledger.
    pub fn into_ledger(self) -> L {
        self.ledger
    }

    /// All requests in creation order.
    pub fn requests(&self) -> &[PettyCashRequest] {
        &self.requests
    }

    /// Looks up a request.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` for an unknown id.
    pub fn request(&self, id: RequestId) -> Result<&PettyCashRequest, PettyCashError> {
        self.requests
            .iter()
            .find(|r| r.id == id)
            .ok_or(PettyCashError::RequestNotFound(id))
    }

    fn request_mut(&mut self, id: RequestId) -> Result<&mut PettyCashRequest, PettyCashError> {
        self.requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PettyCashError::RequestNotFound(id))
    }

    fn petty_journal(&self, request: &PettyCashRequest) -> Result<Journal, PettyCashError> {
        let id = request
            .petty_cash_journal_id
            .ok_or(PettyCashError::MissingPettyCashJournal)?;
        Ok(self.ledger.journal(id)?)
    }

    fn ensure_paid(request: &PettyCashRequest) -> Result<(), PettyCashError> {
        if request.state != RequestState::Complete || request.advance_lines.is_empty() {
            return Err(PettyCashError::AdvanceNotPaid(request.name.clone()));
        }
        Ok(())
    }

    fn advance_context(&self, request: &PettyCashRequest) -> Result<AdvanceContext, PettyCashError> {
        let journal = self.petty_journal(request)?;
        let petty_account = default_account(&journal)?;
        let suspense_account =
            journal
                .suspense_account
                .ok_or_else(|| PettyCashError::JournalMissingAccount {
                    journal: journal.code.clone(),
                    account: "suspense",
                })?;
        let requester = request
            .requester_partner()
            .ok_or(PettyCashError::MissingRequester)?;

        Ok(AdvanceContext {
            name: request.name.clone(),
            narration: request.narration.clone(),
            petty_journal: journal.id,
            petty_account,
            suspense_account,
            requester,
            analytic: request.analytic_distribution.clone(),
            advance_lines: request.advance_lines.clone(),
            date: today(),
        })
    }

    /// Creates a draft request. A sequence name is assigned when the name is
    /// absent or the `"New"` placeholder.
    pub fn create(&mut self, new: NewRequest) -> RequestId {
        let order_date = new.order_date.unwrap_or_else(today);
        let name = match new.name {
            Some(name) if !name.is_empty() && name != PLACEHOLDER_NAME => name,
            _ => self.sequence.next_name(order_date),
        };

        let request = PettyCashRequest {
            id: RequestId::new(),
            name,
            narration: new.narration,
            order_date,
            approve_date: None,
            requester: new.requester,
            amount: new.amount,
            petty_cash_journal_id: new.petty_cash_journal_id.or(self.petty_cash_journal),
            operation_journal_id: None,
            operation_account_id: self.suspense_account,
            analytic_distribution: new.analytic_distribution,
            move_id: None,
            reversal_move_id: None,
            advance_lines: Vec::new(),
            settlements: Vec::new(),
            state: RequestState::Draft,
            note: new.note,
        };
        let id = request.id;
        info!(request = %request.name, amount = %request.amount, "petty cash request created");
        self.requests.push(request);
        id
    }

    /// Sets an employee as requester, booked against their home partner.
    ///
    /// # Errors
    ///
    /// Returns `MissingHomeAddress` when the employee has no home partner;
    /// the previous requester is kept.
    pub fn assign_employee(
        &mut self,
        id: RequestId,
        employee: &Employee,
    ) -> Result<(), PettyCashError> {
        let request = self.request_mut(id)?;
        let Some(partner) = employee.home_partner else {
            warn!(request = %request.name, employee = %employee.name, "employee has no private address");
            return Err(PettyCashError::MissingHomeAddress {
                employee: employee.name.clone(),
            });
        };
        request.requester = Some(Requester::Employee {
            employee: employee.id,
            partner,
        });
        Ok(())
    }

    /// Sets a partner as requester.
    pub fn assign_partner(&mut self, id: RequestId, partner: PartnerId) -> Result<(), PettyCashError> {
        self.ledger.partner(partner)?;
        self.request_mut(id)?.requester = Some(Requester::Partner { partner });
        Ok(())
    }

    /// Sets or clears the operation journal. The operation account follows:
    /// the journal's default account, or the company suspense account when
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperationJournal` unless the journal is a cash or bank
    /// journal other than the request's petty cash journal.
    pub fn set_operation_journal(
        &mut self,
        id: RequestId,
        journal: Option<JournalId>,
    ) -> Result<(), PettyCashError> {
        let petty_journal = self.request(id)?.petty_cash_journal_id;
        let account = match journal {
            Some(journal_id) => {
                let journal = self.ledger.journal(journal_id)?;
                if !journal.kind.is_liquidity() || Some(journal.id) == petty_journal {
                    return Err(PettyCashError::InvalidOperationJournal(journal.code));
                }
                journal.default_account
            }
            None => self.suspense_account,
        };

        let request = self.request_mut(id)?;
        request.operation_journal_id = journal;
        request.operation_account_id = account;
        Ok(())
    }

    /// Approves a draft request, creating its (unposted) advance entry.
    ///
    /// # Errors
    ///
    /// - `UnreconciledRequest` when the requester holds another draft or open
    ///   advance that is not fully settled
    /// - a user error when the journal, narration, amount or requester is
    ///   missing, or the entry already exists
    pub fn approve(&mut self, id: RequestId) -> Result<EntryId, PettyCashError> {
        let request = self.request(id)?;
        if request.has_request_not_reconciled(&self.requests) {
            let partner = request
                .requester_partner()
                .and_then(|p| self.ledger.partner(p).ok())
                .map(|p| p.name)
                .unwrap_or_default();
            warn!(request = %request.name, %partner, "requester has an unsettled petty cash");
            return Err(PettyCashError::UnreconciledRequest { partner });
        }
        let journal = request
            .petty_cash_journal_id
            .ok_or(PettyCashError::MissingPettyCashJournal)?;
        if request.narration.trim().is_empty() {
            return Err(PettyCashError::MissingNarration);
        }
        if request.amount <= Decimal::ZERO {
            return Err(PettyCashError::MissingAmount);
        }
        let requester = request
            .requester_partner()
            .ok_or(PettyCashError::MissingRequester)?;
        if request.move_id.is_some() {
            return Err(PettyCashError::EntryAlreadyCreated);
        }
        let next = RequestLifecycle::approve(request.state)?;

        let date = today();
        let header = EntryHeader {
            journal,
            date,
            reference: request.name.clone(),
            narration: request.narration.clone(),
            kind: EntryKind::Entry,
            partner: Some(requester),
        };
        let entry = self.ledger.create_entry(header)?;

        let request = self.request_mut(id)?;
        request.move_id = Some(entry);
        request.state = next;
        request.approve_date = Some(date);
        info!(request = %request.name, entry = %entry, "petty cash request approved");
        Ok(entry)
    }

    /// Pays out an approved request: debit the petty cash account, credit
    /// `operation_account`, post the advance entry.
    ///
    /// # Errors
    ///
    /// Returns a user error when the entry or the operation journal is
    /// missing; ledger errors roll the whole payout back.
    pub fn pay(
        &mut self,
        id: RequestId,
        operation_account: AccountId,
        amount: Decimal,
    ) -> Result<(), PettyCashError> {
        let request = self.request(id)?;
        let entry = request.move_id.ok_or(PettyCashError::MissingEntry)?;
        if request.operation_journal_id.is_none() {
            return Err(PettyCashError::MissingOperationJournal);
        }
        let next = RequestLifecycle::pay(request.state)?;
        if amount <= Decimal::ZERO {
            return Err(PettyCashError::NonPositiveAmount(amount));
        }
        let petty_account = default_account(&self.petty_journal(request)?)?;
        let lines = vec![
            tag(request, LineInput::debit(petty_account, amount, &request.narration)),
            tag(request, LineInput::credit(operation_account, amount, &request.narration)),
        ];

        let petty_line = in_transaction(&mut self.ledger, |ledger| {
            let ids = ledger.add_lines(entry, lines)?;
            ledger.post(entry)?;
            ids.first()
                .copied()
                .ok_or(PettyCashError::Ledger(LedgerError::InsufficientEntries))
        })?;

        let request = self.request_mut(id)?;
        request.advance_lines.push(petty_line);
        request.operation_account_id = Some(operation_account);
        request.state = next;
        info!(request = %request.name, amount = %amount, "petty cash paid");
        Ok(())
    }

    /// Rejects a request. A draft advance entry is deleted; a posted one is
    /// reversed and each line matched with its mirror.
    pub fn reject(&mut self, id: RequestId) -> Result<(), PettyCashError> {
        let request = self.request(id)?;
        let next = RequestLifecycle::reject(request.state)?;
        let move_id = request.move_id;

        let reversal = match move_id {
            Some(entry) => {
                let date = today();
                in_transaction(&mut self.ledger, |ledger| cancel_advance(ledger, entry, date))?
            }
            None => None,
        };

        let request = self.request_mut(id)?;
        request.move_id = None;
        request.advance_lines.clear();
        if reversal.is_some() {
            request.reversal_move_id = reversal;
        }
        request.state = next;
        info!(request = %request.name, reversed = reversal.is_some(), "petty cash request rejected");
        Ok(())
    }

    /// Reopens a rejected request as a draft.
    pub fn reopen(&mut self, id: RequestId) -> Result<(), PettyCashError> {
        let request = self.request_mut(id)?;
        request.state = RequestLifecycle::reopen(request.state)?;
        request.approve_date = None;
        info!(request = %request.name, "petty cash request reopened");
        Ok(())
    }

    /// Returns the unspent remainder: debit `return_account`, credit the
    /// petty cash account, match the credit with the advance and record a
    /// reconciled settlement of `amount`.
    ///
    /// # Errors
    ///
    /// Returns `SettlementExceedsAdvance` before posting when the settlement
    /// total would exceed the advance, and `AdvanceNotCovered` when less than
    /// `amount` is left unmatched on the advance lines.
    pub fn return_remaining(
        &mut self,
        id: RequestId,
        return_account: AccountId,
        amount: Decimal,
    ) -> Result<SettlementId, PettyCashError> {
        if amount <= Decimal::ZERO {
            return Err(PettyCashError::NonPositiveAmount(amount));
        }
        let request = self.request(id)?;
        Self::ensure_paid(request)?;
        let total = request.settlement_amount() + amount;
        if total > request.amount {
            warn!(request = %request.name, %total, "return exceeds petty cash");
            return Err(PettyCashError::SettlementExceedsAdvance {
                total,
                amount: request.amount,
            });
        }

        let open = SettlementEngine::open_advance(&self.ledger, &request.advance_lines)?;
        if amount > open {
            return Err(PettyCashError::AdvanceNotCovered {
                claimed: amount,
                open,
            });
        }

        let journal = self.petty_journal(request)?;
        let petty_account = default_account(&journal)?;
        let label = format!("Return The Remaining of ( {} )", request.narration);
        let header = EntryHeader {
            journal: journal.id,
            date: today(),
            reference: format!("Return The Remaining of {}", request.name),
            narration: label.clone(),
            kind: EntryKind::Entry,
            partner: None,
        };
        let lines = vec![
            tag(request, LineInput::debit(return_account, amount, &label)),
            tag(request, LineInput::credit(petty_account, amount, &label)),
        ];
        let advance_lines = request.advance_lines.clone();

        let entry = in_transaction(&mut self.ledger, |ledger| {
            let (entry, ids) = record_entry(ledger, header, lines)?;
            if let Some(credit) = ids.last() {
                SettlementEngine::draw_down(ledger, &advance_lines, *credit)?;
            }
            Ok::<_, PettyCashError>(entry)
        })?;

        let settlement = Settlement::adjustment(label, amount);
        let settlement_id = settlement.id;
        let request = self.request_mut(id)?;
        request.settlements.push(settlement);
        info!(request = %request.name, entry = %entry, %amount, "remaining petty cash returned");
        Ok(settlement_id)
    }

    /// Tops up an overspent advance: debit the petty cash account, credit
    /// `account`. The new petty cash line becomes an advance line, and a
    /// reconciled settlement of `-amount` makes room for the claims it
    /// funds.
    pub fn record_overage(
        &mut self,
        id: RequestId,
        account: AccountId,
        amount: Decimal,
    ) -> Result<SettlementId, PettyCashError> {
        if amount <= Decimal::ZERO {
            return Err(PettyCashError::NonPositiveAmount(amount));
        }
        let request = self.request(id)?;
        Self::ensure_paid(request)?;

        let journal = self.petty_journal(request)?;
        let petty_account = default_account(&journal)?;
        let label = format!(
            "Settlement of intemperance amount of ( {} )",
            request.narration
        );
        let header = EntryHeader {
            journal: journal.id,
            date: today(),
            reference: format!("Intemperance amount of {}", request.name),
            narration: label.clone(),
            kind: EntryKind::Entry,
            partner: None,
        };
        let lines = vec![
            tag(request, LineInput::debit(petty_account, amount, &label)),
            tag(request, LineInput::credit(account, amount, &label)),
        ];

        let petty_line = in_transaction(&mut self.ledger, |ledger| {
            let (_, ids) = record_entry(ledger, header, lines)?;
            ids.first()
                .copied()
                .ok_or(PettyCashError::Ledger(LedgerError::InsufficientEntries))
        })?;

        let settlement = Settlement::adjustment(label, -amount);
        let settlement_id = settlement.id;
        let request = self.request_mut(id)?;
        request.advance_lines.push(petty_line);
        request.settlements.push(settlement);
        info!(request = %request.name, %amount, "petty cash overage recorded");
        Ok(settlement_id)
    }

    /// Default operation for a request. Before payout it is the payout of
    /// the full amount. Once paid, pending claims larger than what is left
    /// on the advance suggest an overage for the difference; a partly
    /// settled advance suggests returning what the pending claims leave.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntry` before the request is approved.
    pub fn suggest_operation(&self, id: RequestId) -> Result<OperationSuggestion, PettyCashError> {
        let request = self.request(id)?;
        if request.move_id.is_none() {
            return Err(PettyCashError::MissingEntry);
        }
        let pay = OperationSuggestion::Pay {
            amount: request.amount,
        };
        if request.advance_lines.is_empty() {
            return Ok(pay);
        }

        let open = SettlementEngine::open_advance(&self.ledger, &request.advance_lines)?;
        let pending: Decimal = request
            .settlements
            .iter()
            .filter(|s| !s.is_reconciled)
            .map(|s| s.amount)
            .sum();
        let settled = request.settlement_amount();
        Ok(if pending > open {
            OperationSuggestion::Overage {
                amount: pending - open,
            }
        } else if settled > Decimal::ZERO && settled < request.amount && open > pending {
            OperationSuggestion::Return {
                amount: open - pending,
            }
        } else {
            pay
        })
    }

    /// Builds a settlement for a posted vendor bill in the ledger.
    pub fn bill_settlement(&self, entry: EntryId) -> Result<Settlement, PettyCashError> {
        Settlement::for_bill(SettlementEngine::bill_ref(&self.ledger, entry)?)
    }

    /// Builds a settlement for a posted expense sheet in the ledger.
    pub fn expense_sheet_settlement(&self, entry: EntryId) -> Result<Settlement, PettyCashError> {
        Settlement::for_expense_sheet(SettlementEngine::expense_sheet_ref(&self.ledger, entry)?)
    }

    /// Attaches a settlement.
    ///
    /// # Errors
    ///
    /// - `NonPositiveAmount` for a zero or negative claim
    /// - `AdjustmentNotAttachable` for adjustment or already reconciled rows
    /// - `SettlementExceedsAdvance` when the settlement total would exceed
    ///   the advance
    ///
    /// The settlements are left unchanged on error.
    pub fn attach_settlement(
        &mut self,
        id: RequestId,
        settlement: Settlement,
    ) -> Result<SettlementId, PettyCashError> {
        if settlement.amount <= Decimal::ZERO {
            return Err(PettyCashError::NonPositiveAmount(settlement.amount));
        }
        if settlement.is_reconciled || matches!(settlement.source, SettlementSource::Adjustment) {
            return Err(PettyCashError::AdjustmentNotAttachable(settlement.name));
        }
        let request = self.request_mut(id)?;
        let total = request.settlement_amount() + settlement.amount;
        if total > request.amount {
            warn!(request = %request.name, %total, "settlements exceed petty cash");
            return Err(PettyCashError::SettlementExceedsAdvance {
                total,
                amount: request.amount,
            });
        }
        let settlement_id = settlement.id;
        debug!(request = %request.name, settlement = %settlement.name, amount = %settlement.amount, "settlement attached");
        request.settlements.push(settlement);
        Ok(settlement_id)
    }

    /// Detaches a settlement that is not reconciled yet.
    pub fn detach_settlement(
        &mut self,
        id: RequestId,
        settlement_id: SettlementId,
    ) -> Result<Settlement, PettyCashError> {
        let request = self.request_mut(id)?;
        let position = request
            .settlements
            .iter()
            .position(|s| s.id == settlement_id)
            .ok_or(PettyCashError::SettlementNotFound(settlement_id))?;
        let settlement = &request.settlements[position];
        if settlement.is_reconciled {
            return Err(PettyCashError::SettlementReconciled(settlement.name.clone()));
        }
        let removed = request.settlements.remove(position);
        debug!(request = %request.name, settlement = %removed.name, "settlement detached");
        Ok(removed)
    }

    /// Nets every unreconciled settlement against the paid advance.
    ///
    /// All claims are validated before the first posting and the whole run
    /// is one ledger transaction: on failure nothing is posted and no
    /// settlement is marked reconciled.
    pub fn confirm_settlements(&mut self, id: RequestId) -> Result<SettlementReport, PettyCashError> {
        let request = self.request(id)?;
        if !request.in_settlement() {
            return Ok(SettlementReport::default());
        }
        Self::ensure_paid(request)?;
        let ctx = self.advance_context(request)?;
        let mut settlements = request.settlements.clone();

        let report = in_transaction(&mut self.ledger, |ledger| {
            SettlementEngine::run(ledger, &ctx, &mut settlements)
        })?;

        self.request_mut(id)?.settlements = settlements;
        Ok(report)
    }

    /// Lines of the advance entry, with their reconciliation state.
    ///
    /// # Errors
    ///
    /// Returns `MissingEntry` when the request has no advance entry.
    pub fn reconcile_view(&self, id: RequestId) -> Result<Vec<JournalLine>, PettyCashError> {
        let entry = self.request(id)?.move_id.ok_or(PettyCashError::MissingEntry)?;
        Ok(self.ledger.entry(entry)?.lines)
    }
}
