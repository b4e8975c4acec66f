//! Replies - the conversation thread of a ticket.
//!
//! A thread is the ticket's replies ordered by `created_at`, oldest first.
//! Owners and staff write into the same thread; nothing marks a reply as
//! internal.
//!
//! # Invariants
//! - a reply belongs to exactly one ticket and is never edited or moved
//! - storing a reply advances the ticket's `updated_at` to at least the
//!   reply's `created_at`, in the same store call
//! - replies survive a soft delete of their ticket; they just stop being
//!   reachable through it
//!
//! Whether a reply is accepted at all (closed tickets) is decided by
//! `domain::state::LifecyclePolicy`, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ReplyId, TicketId, UserId};

/// A message appended to a ticket. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReply {
    pub id: ReplyId,
    pub ticket_id: TicketId,
    pub author_id: UserId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Reply insert. Storing it also advances the parent ticket's `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    pub ticket_id: TicketId,
    pub author_id: UserId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
