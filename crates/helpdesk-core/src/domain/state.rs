//! Ticket status state machine.
//!
//! State transitions:
//! - Waiting -> InProgress
//! - InProgress -> Closed
//!
//! Closed is terminal for status changes. Whether a closed ticket still
//! accepts replies is a separate, configurable policy.

use serde::{Deserialize, Serialize};

use super::ticket::TicketStatus;

impl TicketStatus {
    /// Is this a terminal state (no further status changes)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Closed)
    }

    /// Is `self -> next` a legal status change?
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Waiting, TicketStatus::InProgress)
                | (TicketStatus::InProgress, TicketStatus::Closed)
        )
    }
}

/// Lifecycle rules that vary between deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecyclePolicy {
    /// Replies (and their notifications) are still accepted on closed tickets.
    pub closed_accepts_replies: bool,
}

impl LifecyclePolicy {
    /// Closed tickets stay open for replies.
    pub fn permissive() -> Self {
        Self {
            closed_accepts_replies: true,
        }
    }

    /// Closed tickets reject new replies.
    pub fn strict() -> Self {
        Self {
            closed_accepts_replies: false,
        }
    }

    pub fn accepts_reply(&self, status: TicketStatus) -> bool {
        !status.is_terminal() || self.closed_accepts_replies
    }
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self::permissive()
    }
}
