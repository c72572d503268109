//! Request state machine.
//!
//! Validates each transition of a petty cash request and returns the state
//! it moves to. Ledger side effects are applied by the desk only after the
//! transition has been accepted here.

use crate::petty_cash::error::PettyCashError;
use crate::petty_cash::types::RequestState;

/// Stateless service validating request state transitions.
pub struct RequestLifecycle;

impl RequestLifecycle {
    /// Approve a draft request.
    ///
    /// # Returns
    /// * `Ok(RequestState::Approval)` if the transition is valid
    /// * `Err(PettyCashError::InvalidTransition)` if not in Draft state
    pub fn approve(current: RequestState) -> Result<RequestState, PettyCashError> {
        match current {
            RequestState::Draft => Ok(RequestState::Approval),
            _ => Err(PettyCashError::InvalidTransition {
                from: current,
                to: RequestState::Approval,
            }),
        }
    }

    /// Pay out an approved request.
    pub fn pay(current: RequestState) -> Result<RequestState, PettyCashError> {
        match current {
            RequestState::Approval => Ok(RequestState::Complete),
            _ => Err(PettyCashError::InvalidTransition {
                from: current,
                to: RequestState::Complete,
            }),
        }
    }

    /// Reject a request in any state but `Reject`.
    pub fn reject(current: RequestState) -> Result<RequestState, PettyCashError> {
        match current {
            RequestState::Draft | RequestState::Approval | RequestState::Complete => {
                Ok(RequestState::Reject)
            }
            RequestState::Reject => Err(PettyCashError::InvalidTransition {
                from: current,
                to: RequestState::Reject,
            }),
        }
    }

    /// Reopen a rejected request as a draft.
    ///
    /// Completed requests stay closed: their advance is posted and settled
    /// against, so they are corrected through reject, not reopened.
    pub fn reopen(current: RequestState) -> Result<RequestState, PettyCashError> {
        match current {
            RequestState::Reject => Ok(RequestState::Draft),
            _ => Err(PettyCashError::InvalidTransition {
                from: current,
                to: RequestState::Draft,
            }),
        }
    }
}
