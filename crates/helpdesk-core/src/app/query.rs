//! Listing query - ticket listing parameters as they arrive from the web layer.
//!
//! # Parameters
//! - `search`: substring of title or description; a number also matches the
//!   ticket id
//! - `status`: `all`, `open`, `in_progress` or `closed`
//! - `priority`: `all` or a stored priority code, compared verbatim
//!
//! An absent or empty `status`/`priority` means `all`. Values are not
//! normalised: `OPEN` is not `open`, and unknown statuses match nothing.
//! The result is always scoped to one owner.

use serde::{Deserialize, Serialize};

use crate::domain::{TicketId, TicketStatus, UserId};
use crate::ports::{StatusFilter, TextSearch, TicketFilter};

/// Raw listing parameters. `None` means the parameter was absent, which is
/// not the same as present-but-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl ListQuery {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Store filter for `owner`'s tickets.
    pub fn to_filter(&self, owner: UserId) -> TicketFilter {
        TicketFilter {
            owner_id: Some(owner),
            search: self.search.as_deref().and_then(parse_search),
            status: self
                .status
                .as_deref()
                .map(parse_status_filter)
                .unwrap_or_default(),
            priority: self.priority.as_deref().and_then(parse_priority_filter),
            limit: None,
        }
    }
}

/// Blank text searches nothing. Text that parses as an integer also matches
/// the ticket with that id.
pub fn parse_search(raw: &str) -> Option<TextSearch> {
    if raw.is_empty() {
        return None;
    }
    let id_match = raw
        .parse::<i64>()
        .ok()
        .and_then(|n| u64::try_from(n).ok())
        .map(TicketId::new);
    Some(TextSearch {
        needle: raw.to_string(),
        id_match,
    })
}

/// `all` and an empty value are no filter. Any other unknown value falls
/// through to a status no ticket has, so it matches nothing.
pub fn parse_status_filter(raw: &str) -> StatusFilter {
    match raw {
        "" | "all" => StatusFilter::Any,
        "open" => StatusFilter::Is(TicketStatus::Waiting),
        "in_progress" => StatusFilter::Is(TicketStatus::InProgress),
        "closed" => StatusFilter::Is(TicketStatus::Closed),
        _ => StatusFilter::Unmatchable,
    }
}

/// `all` and an empty value are no filter; anything else is compared
/// verbatim with the stored code.
pub fn parse_priority_filter(raw: &str) -> Option<String> {
    match raw {
        "" | "all" => None,
        code => Some(code.to_string()),
    }
}
