//! TicketStore port - the persistent store behind the lifecycle engine.
//!
//! The engine never holds a global handle; a store is injected into each
//! component that needs one. Row-level consistency (including the
//! `updated_at` bump that accompanies each reply) is the store's job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    Department, DepartmentId, NewReply, NewTicket, Ticket, TicketId, TicketReply, TicketStatus,
    User, UserId,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: u64 },
}

/// Status condition of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Any,
    Is(TicketStatus),
    /// Compares against a status value no ticket can hold, so nothing matches.
    Unmatchable,
}

impl StatusFilter {
    pub fn matches(&self, status: TicketStatus) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Is(wanted) => *wanted == status,
            StatusFilter::Unmatchable => false,
        }
    }
}

/// Free-text condition: `id == id_match OR title ∋ needle OR description ∋ needle`.
/// Substring matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub needle: String,
    pub id_match: Option<TicketId>,
}

impl TextSearch {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.id_match == Some(ticket.id)
            || ticket.title.contains(&self.needle)
            || ticket.description.contains(&self.needle)
    }
}

/// Listing conditions, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// `None` lists every owner's tickets (staff views).
    pub owner_id: Option<UserId>,
    pub search: Option<TextSearch>,
    pub status: StatusFilter,
    /// Raw priority code, compared for equality.
    pub priority: Option<String>,
    pub limit: Option<usize>,
}

impl TicketFilter {
    pub fn owned_by(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        ticket.deleted_at.is_none()
            && self.owner_id.is_none_or(|owner| owner == ticket.owner_id)
            && self.search.as_ref().is_none_or(|s| s.matches(ticket))
            && self.status.matches(ticket.status)
            && self
                .priority
                .as_deref()
                .is_none_or(|p| p == ticket.priority.code())
    }
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    // ── Tickets ──

    /// Insert a ticket; the store assigns the id.
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError>;

    /// Look a ticket up, optionally scoped to an owner. Soft-deleted tickets
    /// and owner mismatches both yield `None`.
    async fn find_ticket(
        &self,
        id: TicketId,
        owner: Option<UserId>,
    ) -> Result<Option<Ticket>, StoreError>;

    /// Matching tickets, newest-created first.
    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, StoreError>;

    /// Number of matching tickets (`limit` is ignored).
    async fn count_tickets(&self, filter: &TicketFilter) -> Result<usize, StoreError>;

    async fn update_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn soft_delete_ticket(&self, id: TicketId, at: DateTime<Utc>) -> Result<(), StoreError>;

    // ── Replies ──

    /// Store a reply and advance the ticket's `updated_at` in one step.
    async fn append_reply(&self, reply: NewReply) -> Result<TicketReply, StoreError>;

    /// Replies of a ticket in creation order.
    async fn list_replies(&self, ticket_id: TicketId) -> Result<Vec<TicketReply>, StoreError>;

    async fn count_replies(&self, ticket_id: TicketId) -> Result<usize, StoreError>;

    // ── Reference data ──

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_department(&self, id: DepartmentId) -> Result<Option<Department>, StoreError>;

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError>;
}
