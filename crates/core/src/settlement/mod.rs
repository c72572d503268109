//! Settlement claims and the reconciliation engine.
//!
//! # Modules
//!
//! - `types` - Settlement lines and their claim sources
//! - `engine` - Bridge postings netting claims against the advance

pub mod engine;
pub mod types;

pub use engine::{
    AdvanceContext, BareClaim, ClaimKind, PreparedClaim, SettlementEngine, SettlementPlan,
    SettlementReport,
};
pub use types::{
    BillRef, ExpenseSheetRef, ExpenseSheetState, PaymentState, Product, Settlement,
    SettlementSource,
};
