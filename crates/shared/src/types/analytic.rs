//! Analytic distribution attached to ledger lines.
//!
//! A distribution maps analytic accounts to the percentage of a line's
//! amount charged to each of them. Percentages use `Decimal`, never floats.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::AnalyticAccountId;

/// Errors raised while building an analytic distribution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticError {
    /// A percentage was zero, negative or above one hundred.
    #[error("Analytic percentage {0} must be in (0, 100]")]
    PercentageOutOfRange(Decimal),
}

/// Percentage split of an amount over analytic accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyticDistribution(BTreeMap<AnalyticAccountId, Decimal>);

impl AnalyticDistribution {
    /// Creates an empty distribution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Charges the full amount to a single analytic account.
    #[must_use]
    pub fn single(account: AnalyticAccountId) -> Self {
        let mut map = BTreeMap::new();
        map.insert(account, Decimal::ONE_HUNDRED);
        Self(map)
    }

    /// Adds or replaces the share of an analytic account.
    pub fn insert(
        &mut self,
        account: AnalyticAccountId,
        percentage: Decimal,
    ) -> Result<(), AnalyticError> {
        if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(AnalyticError::PercentageOutOfRange(percentage));
        }
        self.0.insert(account, percentage);
        Ok(())
    }

    /// Returns true if no analytic account is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the share of an analytic account, if any.
    #[must_use]
    pub fn percentage(&self, account: AnalyticAccountId) -> Option<Decimal> {
        self.0.get(&account).copied()
    }

    /// Iterates over `(account, percentage)` pairs in account order.
    pub fn iter(&self) -> impl Iterator<Item = (AnalyticAccountId, Decimal)> + '_ {
        self.0.iter().map(|(account, pct)| (*account, *pct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_single_is_full_share() {
        let account = AnalyticAccountId::new();
        let dist = AnalyticDistribution::single(account);
        assert_eq!(dist.percentage(account), Some(dec!(100)));
        assert!(!dist.is_empty());
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-5))]
    #[case(dec!(100.01))]
    fn test_insert_rejects_out_of_range(#[case] pct: Decimal) {
        let mut dist = AnalyticDistribution::new();
        assert_eq!(
            dist.insert(AnalyticAccountId::new(), pct),
            Err(AnalyticError::PercentageOutOfRange(pct))
        );
        assert!(dist.is_empty());
    }

    #[test]
    fn test_insert_split() {
        let (a, b) = (AnalyticAccountId::new(), AnalyticAccountId::new());
        let mut dist = AnalyticDistribution::new();
        dist.insert(a, dec!(60)).unwrap();
        dist.insert(b, dec!(40)).unwrap();
        let total: Decimal = dist.iter().map(|(_, pct)| pct).sum();
        assert_eq!(total, dec!(100));
    }
}
