//! Property-based tests for the petty cash desk.
//!
//! Covers the settlement cap and the derived settlement amounts under
//! random attach/detach sequences, and the lifecycle state machine under
//! random transition attempts.

use proptest::prelude::*;
use pettycash_shared::PettyCashConfig;
use rust_decimal::Decimal;

use crate::ledger::{AccountType, JournalKind, MemoryLedger};
use crate::petty_cash::desk::PettyCashDesk;
use crate::petty_cash::error::PettyCashError;
use crate::petty_cash::lifecycle::RequestLifecycle;
use crate::petty_cash::types::{NewRequest, RequestState, Requester};
use crate::settlement::Settlement;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 10,000.00
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_state() -> impl Strategy<Value = RequestState> {
    prop_oneof![
        Just(RequestState::Draft),
        Just(RequestState::Approval),
        Just(RequestState::Complete),
        Just(RequestState::Reject),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Attach(Decimal),
    Detach(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        positive_amount().prop_map(Op::Attach),
        (0usize..8).prop_map(Op::Detach),
    ]
}

fn desk_with_request(amount: Decimal) -> (PettyCashDesk<MemoryLedger>, pettycash_shared::types::RequestId) {
    let mut ledger = MemoryLedger::new();
    let petty = ledger.add_account("103000", "Petty Cash", AccountType::Cash, true);
    ledger.add_journal("PTC", "Petty Cash", JournalKind::Cash, Some(petty), None);
    let partner = ledger.add_partner("Requester");
    let mut desk = PettyCashDesk::new(ledger, &PettyCashConfig::default());
    let id = desk.create(NewRequest {
        narration: "Office run".to_string(),
        amount,
        requester: Some(Requester::Partner { partner }),
        ..NewRequest::default()
    });
    (desk, id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Derived amounts always match the attached settlements, and the cap
    /// is never exceeded whatever the attach/detach sequence.
    #[test]
    fn prop_settlement_amounts_track_attachments(
        amount in positive_amount(),
        ops in prop::collection::vec(arb_op(), 1..20),
    ) {
        let (mut desk, id) = desk_with_request(amount);

        for op in ops {
            let before = desk.request(id).unwrap().settlements.clone();
            match op {
                Op::Attach(claim) => {
                    let result = desk.attach_settlement(id, Settlement::bare("claim", claim, None));
                    let total: Decimal = before.iter().map(|s| s.amount).sum::<Decimal>() + claim;
                    if total > amount {
                        let is_cap_error = matches!(
                            result,
                            Err(PettyCashError::SettlementExceedsAdvance { .. })
                        );
                        prop_assert!(is_cap_error);
                        prop_assert_eq!(&desk.request(id).unwrap().settlements, &before);
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
                Op::Detach(index) => {
                    if let Some(settlement) = before.get(index) {
                        prop_assert!(desk.detach_settlement(id, settlement.id).is_ok());
                    }
                }
            }

            let request = desk.request(id).unwrap();
            let sum: Decimal = request.settlements.iter().map(|s| s.amount).sum();
            prop_assert_eq!(request.settlement_amount(), sum);
            prop_assert_eq!(request.different_amount(), amount - sum);
            prop_assert!(sum <= amount);
        }
    }

    /// Only draft requests can be approved and only approved ones paid.
    #[test]
    fn prop_lifecycle_transitions(state in arb_state()) {
        prop_assert_eq!(
            RequestLifecycle::approve(state).is_ok(),
            state == RequestState::Draft
        );
        prop_assert_eq!(
            RequestLifecycle::pay(state).is_ok(),
            state == RequestState::Approval
        );
        prop_assert_eq!(
            RequestLifecycle::reopen(state).is_ok(),
            state == RequestState::Reject
        );
        if let Ok(next) = RequestLifecycle::reject(state) {
            prop_assert_eq!(next, RequestState::Reject);
        }
    }
}
