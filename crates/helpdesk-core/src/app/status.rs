//! Read models - what the lifecycle engine hands to the web layer.
//!
//! # Included
//! - **TicketSummary**: one listing row with labels and reply count
//! - **TicketDetail**: a ticket with its whole thread
//! - **TicketCounts** / **Dashboard**: per-status totals and recent tickets
//!
//! Display values (department name, status and priority labels, author
//! names) are resolved while the model is built, so serializing one never
//! goes back to the store. A department that cannot be resolved, missing or
//! unreachable, shows as `UNASSIGNED_DEPARTMENT` rather than failing the read.
//!
//! Models serialize flat: the ticket's own fields sit next to the resolved
//! ones, which is the shape the portal's templates consume.

use serde::Serialize;

use crate::domain::{Ticket, TicketReply};

/// A ticket with its display values resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketSummary {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub department_name: String,
    pub status_label: String,
    pub priority_label: String,
    pub reply_count: usize,
}

/// One reply in a thread, with its author's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadEntry {
    #[serde(flatten)]
    pub reply: TicketReply,
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub department_name: String,
    pub status_label: String,
    pub priority_label: String,
    /// Oldest first.
    pub replies: Vec<ThreadEntry>,
}

impl TicketDetail {
    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }
}

/// Per-status ticket counts for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TicketCounts {
    pub waiting: usize,
    pub in_progress: usize,
    pub closed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub counts: TicketCounts,
    /// Most recently created first.
    pub recent: Vec<TicketSummary>,
}
