//! Errors - lifecycle error taxonomy.
//!
//! - Validation: missing required input, caller re-prompts
//! - NotFound: unknown ticket or someone else's ticket (indistinguishable)
//! - Setup: no department configured, needs an administrator
//! - Persistence: the store failed on the write path
//!
//! Delivery failures live in `notify::DeliveryError` and never reach callers
//! of the lifecycle engine.

use thiserror::Error;

use super::ids::TicketId;
use super::ticket::TicketStatus;
use crate::ports::StoreError;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("missing required field(s): {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("ticket not found")]
    NotFound,

    #[error("no department configured; an administrator must create one first")]
    Setup,

    #[error("cannot change status from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },

    #[error("{0} is closed and no longer accepts replies")]
    Closed(TicketId),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl TicketError {
    /// Errors the caller can resolve by changing its input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TicketError::Validation(_)
                | TicketError::NotFound
                | TicketError::InvalidTransition { .. }
        )
    }
}

pub type TicketResult<T> = Result<T, TicketError>;
