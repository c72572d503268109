//! Settlement claim types.
//!
//! A settlement is one line offsetting part of an advance. Its source is a
//! tagged variant: a vendor bill, a posted expense sheet, a bare claim
//! against an expense account, or a bookkeeping adjustment produced by the
//! return and overage operations.

use pettycash_shared::types::{AccountId, EntryId, PartnerId, ProductId, SettlementId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::petty_cash::error::PettyCashError;

/// Payment state of a vendor bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Nothing paid yet.
    NotPaid,
    /// Part of the payable is matched.
    Partial,
    /// Fully paid.
    Paid,
}

/// State of an expense sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseSheetState {
    /// Approved but not yet posted.
    Approved,
    /// Posted to the ledger.
    Posted,
    /// Paid out.
    Done,
}

/// A vendor bill selected as a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRef {
    /// Posted bill entry.
    pub entry: EntryId,
    /// Bill number.
    pub name: String,
    /// Vendor.
    pub partner: Option<PartnerId>,
    /// Bill total.
    pub amount_total: Decimal,
    /// Payment state at selection time.
    pub payment_state: PaymentState,
}

/// An expense sheet selected as a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSheetRef {
    /// Entry posted for the sheet.
    pub entry: EntryId,
    /// Sheet name.
    pub name: String,
    /// Sheet total.
    pub total_amount: Decimal,
    /// Sheet state at selection time.
    pub state: ExpenseSheetState,
}

/// A product that can be expensed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Standard cost.
    pub standard_price: Decimal,
    /// Expense account configured on the product.
    pub expense_account: Option<AccountId>,
}

/// Where a settlement amount comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettlementSource {
    /// Unpaid vendor bill.
    Bill(BillRef),
    /// Posted expense sheet.
    ExpenseSheet(ExpenseSheetRef),
    /// Claim booked straight to an expense account.
    Bare {
        /// Account debited when the claim is confirmed.
        expense_account: Option<AccountId>,
    },
    /// Row recorded by a return or overage operation.
    Adjustment,
}

/// A settlement line attached to a petty cash request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier.
    pub id: SettlementId,
    /// Description.
    pub name: String,
    /// Signed amount counted against the advance.
    pub amount: Decimal,
    /// Claim source.
    pub source: SettlementSource,
    /// Set once the claim has been netted against the advance. Never reset.
    pub is_reconciled: bool,
    /// Product the claim was derived from.
    pub product: Option<ProductId>,
}

impl Settlement {
    fn with_source(name: String, amount: Decimal, source: SettlementSource) -> Self {
        Self {
            id: SettlementId::new(),
            name,
            amount,
            source,
            is_reconciled: false,
            product: None,
        }
    }

    /// Settlement backed by an unpaid vendor bill, for the bill total.
    ///
    /// # Errors
    ///
    /// Returns `BillNotOpen` unless the bill is not paid at all.
    pub fn for_bill(bill: BillRef) -> Result<Self, PettyCashError> {
        if bill.payment_state != PaymentState::NotPaid {
            return Err(PettyCashError::BillNotOpen(bill.name));
        }
        let name = format!("Settlement from vendor bill by No: {}", bill.name);
        let amount = bill.amount_total;
        Ok(Self::with_source(name, amount, SettlementSource::Bill(bill)))
    }

    /// Settlement backed by a posted expense sheet, for the sheet total.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseSheetNotPosted` unless the sheet is posted.
    pub fn for_expense_sheet(sheet: ExpenseSheetRef) -> Result<Self, PettyCashError> {
        if sheet.state != ExpenseSheetState::Posted {
            return Err(PettyCashError::ExpenseSheetNotPosted(sheet.name));
        }
        let name = format!("Settlement from expense sheet: {}", sheet.name);
        let amount = sheet.total_amount;
        Ok(Self::with_source(
            name,
            amount,
            SettlementSource::ExpenseSheet(sheet),
        ))
    }

    /// Bare claim against an expense account.
    #[must_use]
    pub fn bare(
        name: impl Into<String>,
        amount: Decimal,
        expense_account: Option<AccountId>,
    ) -> Self {
        Self::with_source(
            name.into(),
            amount,
            SettlementSource::Bare { expense_account },
        )
    }

    /// Bare claim priced from a product's standard cost and booked to its
    /// expense account. The product name is used when `name` is `None`.
    #[must_use]
    pub fn from_product(product: &Product, name: Option<String>) -> Self {
        let mut settlement = Self::bare(
            name.unwrap_or_else(|| product.name.clone()),
            product.standard_price,
            product.expense_account,
        );
        settlement.product = Some(product.id);
        settlement
    }

    /// Reconciled bookkeeping row.
    #[must_use]
    pub fn adjustment(name: impl Into<String>, amount: Decimal) -> Self {
        let mut settlement = Self::with_source(name.into(), amount, SettlementSource::Adjustment);
        settlement.is_reconciled = true;
        settlement
    }

    /// Overrides the defaulted amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Returns the ledger entry backing the claim, if any.
    #[must_use]
    pub fn claim_entry(&self) -> Option<EntryId> {
        match &self.source {
            SettlementSource::Bill(bill) => Some(bill.entry),
            SettlementSource::ExpenseSheet(sheet) => Some(sheet.entry),
            SettlementSource::Bare { .. } | SettlementSource::Adjustment => None,
        }
    }

    /// Returns the claim document name (bill number or sheet name).
    #[must_use]
    pub fn claim_name(&self) -> Option<&str> {
        match &self.source {
            SettlementSource::Bill(bill) => Some(&bill.name),
            SettlementSource::ExpenseSheet(sheet) => Some(&sheet.name),
            SettlementSource::Bare { .. } | SettlementSource::Adjustment => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bill(payment_state: PaymentState) -> BillRef {
        BillRef {
            entry: EntryId::new(),
            name: "BILL/2026/0007".to_string(),
            partner: Some(PartnerId::new()),
            amount_total: dec!(400),
            payment_state,
        }
    }

    #[test]
    fn test_bill_settlement_defaults_from_claim() {
        let settlement = Settlement::for_bill(bill(PaymentState::NotPaid)).unwrap();
        assert_eq!(settlement.amount, dec!(400));
        assert_eq!(
            settlement.name,
            "Settlement from vendor bill by No: BILL/2026/0007"
        );
        assert!(!settlement.is_reconciled);
        assert_eq!(settlement.claim_name(), Some("BILL/2026/0007"));
    }

    #[test]
    fn test_paid_bill_rejected() {
        assert_eq!(
            Settlement::for_bill(bill(PaymentState::Paid)),
            Err(PettyCashError::BillNotOpen("BILL/2026/0007".to_string()))
        );
        assert!(Settlement::for_bill(bill(PaymentState::Partial)).is_err());
    }

    #[test]
    fn test_expense_sheet_must_be_posted() {
        let mut sheet = ExpenseSheetRef {
            entry: EntryId::new(),
            name: "Trip to Cairo".to_string(),
            total_amount: dec!(250),
            state: ExpenseSheetState::Approved,
        };
        assert!(matches!(
            Settlement::for_expense_sheet(sheet.clone()),
            Err(PettyCashError::ExpenseSheetNotPosted(_))
        ));

        sheet.state = ExpenseSheetState::Posted;
        let settlement = Settlement::for_expense_sheet(sheet).unwrap();
        assert_eq!(settlement.amount, dec!(250));
        assert_eq!(settlement.name, "Settlement from expense sheet: Trip to Cairo");
    }

    #[test]
    fn test_from_product() {
        let product = Product {
            id: ProductId::new(),
            name: "Printer paper".to_string(),
            standard_price: dec!(12.50),
            expense_account: Some(AccountId::new()),
        };
        let settlement = Settlement::from_product(&product, None);
        assert_eq!(settlement.name, "Printer paper");
        assert_eq!(settlement.amount, dec!(12.50));
        assert_eq!(settlement.product, Some(product.id));
        assert_eq!(
            settlement.source,
            SettlementSource::Bare {
                expense_account: product.expense_account
            }
        );

        let named = Settlement::from_product(&product, Some("Paper for HR".into()));
        assert_eq!(named.name, "Paper for HR");
    }

    #[test]
    fn test_adjustment_is_reconciled() {
        let settlement = Settlement::adjustment("Return", dec!(-30));
        assert!(settlement.is_reconciled);
        assert_eq!(settlement.claim_entry(), None);
        assert_eq!(settlement.amount, dec!(-30));
    }

    #[test]
    fn test_source_serialization_is_tagged() {
        let settlement = Settlement::bare("Taxi", dec!(20), None);
        let json = serde_json::to_value(&settlement.source).unwrap();
        assert_eq!(json["type"], "bare");
    }
}
