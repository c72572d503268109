//! Property-based tests for journal line validation rules.

use proptest::prelude::*;
use pettycash_shared::types::AccountId;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::LineInput;
use super::validation::validate_lines;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // Generate amounts from 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any split of a credit into several debits validates as balanced.
    #[test]
    fn prop_split_debits_balance(amounts in prop::collection::vec(positive_amount(), 1..6)) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut lines: Vec<LineInput> = amounts
            .iter()
            .map(|a| LineInput::debit(AccountId::new(), *a, "expense"))
            .collect();
        lines.push(LineInput::credit(AccountId::new(), total, "petty"));

        let totals = validate_lines(&lines).unwrap();
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.debit, total);
    }

    /// Any difference between the two sides is reported with both totals.
    #[test]
    fn prop_unbalanced_rejected(debit in positive_amount(), credit in positive_amount()) {
        prop_assume!(debit != credit);
        let lines = [
            LineInput::debit(AccountId::new(), debit, "d"),
            LineInput::credit(AccountId::new(), credit, "c"),
        ];
        prop_assert_eq!(
            validate_lines(&lines),
            Err(LedgerError::UnbalancedTransaction { debit, credit })
        );
    }

    /// Zero-amount lines are rejected even when the entry balances.
    #[test]
    fn prop_zero_line_rejected(amount in positive_amount()) {
        let lines = [
            LineInput::debit(AccountId::new(), amount, "d"),
            LineInput::debit(AccountId::new(), Decimal::ZERO, "zero"),
            LineInput::credit(AccountId::new(), amount, "c"),
        ];
        prop_assert_eq!(validate_lines(&lines), Err(LedgerError::ZeroAmount));
    }
}
