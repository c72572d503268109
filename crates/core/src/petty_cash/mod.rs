//! Petty cash request lifecycle.
//!
//! # Modules
//!
//! - `types` - Request, requester and derived settlement state
//! - `error` - Petty cash error taxonomy
//! - `lifecycle` - Request state machine
//! - `sequence` - Request name sequence
//! - `desk` - Request book driving the ledger postings

pub mod desk;
pub mod error;
pub mod lifecycle;
pub mod sequence;
pub mod types;

#[cfg(test)]
mod desk_props;

pub use desk::PettyCashDesk;
pub use error::{ErrorKind, PettyCashError};
pub use lifecycle::RequestLifecycle;
pub use sequence::RequestSequence;
pub use types::{
    Employee, NewRequest, OperationSuggestion, PettyCashRequest, RequestState, Requester,
    SettlementState,
};
