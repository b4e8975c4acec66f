//! Lifecycle events handed to the dispatcher.
//!
//! A `NotificationEvent` is a snapshot: every value the mail template needs is
//! copied in when the event is built, so the dispatched task shares nothing
//! mutable with the request that produced it. Events are never persisted.

use serde::Serialize;

use super::ids::TicketId;

/// Which template an event renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TemplateKind {
    Confirmation,
    Reply,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEvent {
    pub recipient: String,
    pub owner_name: String,
    pub ticket_id: TicketId,
    pub title: String,
    pub status_label: String,
    pub detail: EventDetail,
}

/// Template-specific part of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EventDetail {
    TicketCreated {
        department_name: String,
        priority_label: String,
        description: String,
    },
    ReplyAdded {
        message: String,
        replier_name: String,
    },
}

impl NotificationEvent {
    pub fn template(&self) -> TemplateKind {
        match self.detail {
            EventDetail::TicketCreated { .. } => TemplateKind::Confirmation,
            EventDetail::ReplyAdded { .. } => TemplateKind::Reply,
        }
    }
}
