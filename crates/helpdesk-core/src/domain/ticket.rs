//! Ticket record, status and priority codes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{DepartmentId, TicketId, UserId};

/// Ticket status as stored.
///
/// State transitions (see `domain::state`):
/// - Waiting -> InProgress -> Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Freshly filed, waiting for support.
    Waiting,

    /// Picked up by support.
    InProgress,

    /// Resolved.
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Waiting,
        TicketStatus::InProgress,
        TicketStatus::Closed,
    ];

    /// Stored code, e.g. `IN_PROGRESS`.
    pub fn code(self) -> &'static str {
        match self {
            TicketStatus::Waiting => "WAITING",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Closed => "CLOSED",
        }
    }

    /// Label shown to users and in notification bodies.
    pub fn label(self) -> &'static str {
        match self {
            TicketStatus::Waiting => "Menunggu Balasan",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Closed => "Closed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Maps a raw status code to its label, falling back to the code itself.
pub fn status_label(code: &str) -> String {
    TicketStatus::from_code(code)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Ticket priority.
///
/// Unknown codes are kept verbatim in `Other` so they round-trip through the
/// store and display as themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Other(String),
}

impl TicketPriority {
    /// Parses a form value. Blank input means `Medium`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "MEDIUM" => TicketPriority::Medium,
            "LOW" => TicketPriority::Low,
            "HIGH" => TicketPriority::High,
            other => TicketPriority::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            TicketPriority::Low => "LOW",
            TicketPriority::Medium => "MEDIUM",
            TicketPriority::High => "HIGH",
            TicketPriority::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
            TicketPriority::Other(raw) => raw,
        }
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Medium
    }
}

impl From<String> for TicketPriority {
    fn from(raw: String) -> Self {
        TicketPriority::parse(&raw)
    }
}

impl From<TicketPriority> for String {
    fn from(priority: TicketPriority) -> Self {
        priority.code().to_string()
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Persisted ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub reply_to_email: String,
    pub owner_id: UserId,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker; retired tickets are invisible to every query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }

    pub fn priority_label(&self) -> &str {
        self.priority.label()
    }

    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }
}

/// Validated input for a ticket insert. The store assigns id and timestamps
/// come from the engine's clock.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub reply_to_email: String,
    pub priority: TicketPriority,
    pub owner_id: UserId,
    pub department_id: Option<DepartmentId>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// Raw ticket form as submitted by the web layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketForm {
    pub title: String,
    pub description: String,
    pub reply_to_email: String,
    pub priority: String,
    pub department: String,
}

impl TicketForm {
    /// Names of required fields that are blank after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.reply_to_email.trim().is_empty() {
            missing.push("reply_to_email");
        }
        missing
    }

    /// Department reference; anything that is not an unsigned number is
    /// treated as "no department".
    pub fn department_id(&self) -> Option<DepartmentId> {
        self.department
            .trim()
            .parse::<u32>()
            .ok()
            .map(|id| DepartmentId::new(u64::from(id)))
    }
}
