//! Business rule validation for journal lines.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{LineInput, TransactionTotals};

/// Validates a single line: one-sided, non-zero, non-negative.
pub fn validate_line(line: &LineInput) -> Result<(), LedgerError> {
    if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount);
    }
    if !line.debit.is_zero() && !line.credit.is_zero() {
        return Err(LedgerError::InvalidEntryType);
    }
    if line.debit.is_zero() && line.credit.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    Ok(())
}

/// Validates that a set of lines can be posted as one entry.
///
/// Checks:
/// 1. At least 2 lines
/// 2. Every line is valid on its own
/// 3. Debits equal credits
///
/// # Errors
///
/// Returns the first rule the lines violate.
pub fn validate_lines(lines: &[LineInput]) -> Result<TransactionTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientEntries);
    }

    for line in lines {
        validate_line(line)?;
    }

    let totals = TransactionTotals::new(
        lines.iter().map(|l| l.debit).sum(),
        lines.iter().map(|l| l.credit).sum(),
    );

    if !totals.is_balanced {
        return Err(LedgerError::UnbalancedTransaction {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pettycash_shared::types::AccountId;
    use rust_decimal_macros::dec;

    fn debit(amount: Decimal) -> LineInput {
        LineInput::debit(AccountId::new(), amount, "debit")
    }

    fn credit(amount: Decimal) -> LineInput {
        LineInput::credit(AccountId::new(), amount, "credit")
    }

    #[test]
    fn test_balanced_lines() {
        let totals = validate_lines(&[debit(dec!(100)), credit(dec!(100))]).unwrap();
        assert!(totals.is_balanced);
        assert_eq!(totals.debit, dec!(100));
    }

    #[test]
    fn test_multi_line_balanced() {
        let lines = [debit(dec!(30)), debit(dec!(70)), credit(dec!(100))];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_unbalanced_lines() {
        assert_eq!(
            validate_lines(&[debit(dec!(100)), credit(dec!(50))]),
            Err(LedgerError::UnbalancedTransaction {
                debit: dec!(100),
                credit: dec!(50),
            })
        );
    }

    #[test]
    fn test_insufficient_lines() {
        assert_eq!(
            validate_lines(&[debit(dec!(100))]),
            Err(LedgerError::InsufficientEntries)
        );
        assert_eq!(validate_lines(&[]), Err(LedgerError::InsufficientEntries));
    }

    #[test]
    fn test_zero_line() {
        assert_eq!(
            validate_lines(&[debit(dec!(0)), credit(dec!(0))]),
            Err(LedgerError::ZeroAmount)
        );
    }

    #[test]
    fn test_negative_line() {
        assert_eq!(
            validate_lines(&[debit(dec!(-10)), credit(dec!(-10))]),
            Err(LedgerError::NegativeAmount)
        );
    }

    #[test]
    fn test_two_sided_line() {
        let mut line = debit(dec!(10));
        line.credit = dec!(10);
        assert_eq!(validate_line(&line), Err(LedgerError::InvalidEntryType));
    }
}
