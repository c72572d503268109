//! Petty cash request domain types.
//!
//! The request is the aggregate root: it owns its settlements and references
//! the ledger entries posted on its behalf. Settlement totals and states are
//! derived on demand and never stored.

use std::fmt;

use chrono::NaiveDate;
use pettycash_shared::types::{
    AccountId, AnalyticDistribution, EmployeeId, EntryId, JournalId, LineId, PartnerId,
    RequestId, SettlementId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::settlement::Settlement;

/// Lifecycle state of a request.
///
/// The valid transitions are:
/// - Draft → Approval (approve)
/// - Approval → Complete (pay)
/// - Draft | Approval | Complete → Reject (reject)
/// - Reject → Draft (reopen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    /// Being prepared.
    Draft,
    /// Approved; the advance entry exists but is not posted.
    Approval,
    /// Paid out.
    Complete,
    /// Rejected.
    Reject,
}

impl RequestState {
    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approval => "approval",
            Self::Complete => "complete",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much of the advance the attached settlements cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementState {
    /// Nothing settled.
    No,
    /// Partly settled.
    Partial,
    /// Settled in full (or beyond).
    Full,
}

/// Who receives the advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requester {
    /// A partner directly.
    Partner {
        /// The partner.
        partner: PartnerId,
    },
    /// An employee, resolved to the partner of their private address.
    Employee {
        /// The employee.
        employee: EmployeeId,
        /// The employee's home-address partner.
        partner: PartnerId,
    },
}

impl Requester {
    /// Returns the partner the advance is booked against.
    #[must_use]
    pub fn partner(&self) -> PartnerId {
        match self {
            Self::Partner { partner } | Self::Employee { partner, .. } => *partner,
        }
    }
}

/// Default operation offered for a request with an advance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationSuggestion {
    /// Pay out the advance.
    Pay {
        /// Amount to pay.
        amount: Decimal,
    },
    /// Return the unspent remainder.
    Return {
        /// Amount to return.
        amount: Decimal,
    },
    /// Top up the advance by the overspent amount.
    Overage {
        /// Amount overspent.
        amount: Decimal,
    },
}

/// An employee who may request petty cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier.
    pub id: EmployeeId,
    /// Display name.
    pub name: String,
    /// Partner of the employee's private address.
    pub home_partner: Option<PartnerId>,
}

/// Fields of a new request.
#[derive(Debug, Clone, Default)]
pub struct NewRequest {
    /// Name; a sequence name is assigned when absent or `"New"`.
    pub name: Option<String>,
    /// Purpose of the advance.
    pub narration: String,
    /// Requested advance.
    pub amount: Decimal,
    /// Requester.
    pub requester: Option<Requester>,
    /// Order date; defaults to today.
    pub order_date: Option<NaiveDate>,
    /// Petty cash journal; defaults to the configured journal.
    pub petty_cash_journal_id: Option<JournalId>,
    /// Analytic distribution copied onto every posted line.
    pub analytic_distribution: AnalyticDistribution,
    /// Free-text note.
    pub note: Option<String>,
}

/// A petty cash request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PettyCashRequest {
    /// Unique identifier.
    pub id: RequestId,
    /// Sequence name.
    pub name: String,
    /// Purpose of the advance.
    pub narration: String,
    /// Order date.
    pub order_date: NaiveDate,
    /// Approval date.
    pub approve_date: Option<NaiveDate>,
    /// Requester.
    pub requester: Option<Requester>,
    /// Requested advance.
    pub amount: Decimal,
    /// Cash journal holding the advance.
    pub petty_cash_journal_id: Option<JournalId>,
    /// Cash or bank journal funding the advance.
    pub operation_journal_id: Option<JournalId>,
    /// Account the advance is paid from.
    pub operation_account_id: Option<AccountId>,
    /// Analytic distribution copied onto every posted line.
    pub analytic_distribution: AnalyticDistribution,
    /// Advance entry.
    pub move_id: Option<EntryId>,
    /// Entry that reversed the advance on rejection.
    pub reversal_move_id: Option<EntryId>,
    /// Lines debiting the petty cash account, matched in order.
    pub advance_lines: Vec<LineId>,
    /// Attached settlements.
    pub settlements: Vec<Settlement>,
    /// Lifecycle state.
    pub state: RequestState,
    /// Free-text note.
    pub note: Option<String>,
}

impl PettyCashRequest {
    /// Sum of every attached settlement, reconciled or not.
    #[must_use]
    pub fn settlement_amount(&self) -> Decimal {
        self.settlements.iter().map(|s| s.amount).sum()
    }

    /// `amount - settlement_amount`, signed.
    #[must_use]
    pub fn different_amount(&self) -> Decimal {
        self.amount - self.settlement_amount()
    }

    /// Derived purely from the amounts, not from `state`.
    #[must_use]
    pub fn settlement_state(&self) -> SettlementState {
        let settled = self.settlement_amount();
        if settled >= self.amount {
            SettlementState::Full
        } else if settled > Decimal::ZERO {
            SettlementState::Partial
        } else {
            SettlementState::No
        }
    }

    /// True while any attached settlement awaits confirmation.
    #[must_use]
    pub fn in_settlement(&self) -> bool {
        self.settlements.iter().any(|s| !s.is_reconciled)
    }

    /// Partner of the requester, if assigned.
    #[must_use]
    pub fn requester_partner(&self) -> Option<PartnerId> {
        self.requester.as_ref().map(Requester::partner)
    }

    /// True when this request is a draft and another non-rejected request of
    /// the same requester partner is not fully settled.
    pub fn has_request_not_reconciled<'a>(
        &self,
        others: impl IntoIterator<Item = &'a PettyCashRequest>,
    ) -> bool {
        let Some(partner) = self.requester_partner() else {
            return false;
        };
        self.state == RequestState::Draft
            && others.into_iter().any(|other| {
                other.id != self.id
                    && other.state != RequestState::Reject
                    && other.requester_partner() == Some(partner)
                    && other.settlement_state() != SettlementState::Full
            })
    }

    /// Looks up an attached settlement.
    #[must_use]
    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal, partner: PartnerId) -> PettyCashRequest {
        PettyCashRequest {
            id: RequestId::new(),
            name: "PC/2026/00001".to_string(),
            narration: "Office run".to_string(),
            order_date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            approve_date: None,
            requester: Some(Requester::Partner { partner }),
            amount,
            petty_cash_journal_id: None,
            operation_journal_id: None,
            operation_account_id: None,
            analytic_distribution: AnalyticDistribution::default(),
            move_id: None,
            reversal_move_id: None,
            advance_lines: Vec::new(),
            settlements: Vec::new(),
            state: RequestState::Draft,
            note: None,
        }
    }

    #[rstest]
    #[case(&[], SettlementState::No)]
    #[case(&[dec!(40)], SettlementState::Partial)]
    #[case(&[dec!(40), dec!(60)], SettlementState::Full)]
    #[case(&[dec!(150)], SettlementState::Full)]
    #[case(&[dec!(50), dec!(-50)], SettlementState::No)]
    fn test_settlement_state(#[case] amounts: &[Decimal], #[case] expected: SettlementState) {
        let mut req = request(dec!(100), PartnerId::new());
        req.settlements = amounts
            .iter()
            .map(|a| Settlement::bare("claim", *a, None))
            .collect();
        assert_eq!(req.settlement_state(), expected);
    }

    #[test]
    fn test_derived_amounts() {
        let mut req = request(dec!(1000), PartnerId::new());
        req.settlements.push(Settlement::bare("a", dec!(250), None));
        req.settlements.push(Settlement::adjustment("b", dec!(150)));
        assert_eq!(req.settlement_amount(), dec!(400));
        assert_eq!(req.different_amount(), dec!(600));
        assert!(req.in_settlement());

        req.settlements.remove(0);
        assert!(!req.in_settlement());
    }

    #[test]
    fn test_has_request_not_reconciled() {
        let partner = PartnerId::new();
        let draft = request(dec!(100), partner);
        let mut open = request(dec!(100), partner);
        open.state = RequestState::Complete;

        assert!(draft.has_request_not_reconciled([&open]));
        // only drafts are blocked
        let mut approved = draft.clone();
        approved.state = RequestState::Approval;
        assert!(!approved.has_request_not_reconciled([&open]));

        // a fully settled or rejected request does not block
        let mut settled = open.clone();
        settled.settlements.push(Settlement::bare("all", dec!(100), None));
        assert!(!draft.has_request_not_reconciled([&settled]));
        let mut rejected = open.clone();
        rejected.state = RequestState::Reject;
        assert!(!draft.has_request_not_reconciled([&rejected]));

        // other partners and the request itself are ignored
        let stranger = request(dec!(100), PartnerId::new());
        assert!(!draft.has_request_not_reconciled([&stranger, &draft]));
    }

    #[test]
    fn test_requester_partner() {
        let partner = PartnerId::new();
        let requester = Requester::Employee {
            employee: EmployeeId::new(),
            partner,
        };
        assert_eq!(requester.partner(), partner);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RequestState::Approval.to_string(), "approval");
        assert_eq!(RequestState::Reject.as_str(), "reject");
    }
}
