//! App - the application layer, built by composing ports.
//!
//! # Components
//! - **AppBuilder**: startup wiring and validation
//! - **TicketService**: ticket lifecycle (create, reply, list, status)
//! - **SpawnDispatcher**: fire-and-forget notification delivery
//! - **query** / **status**: listing parameters and read models

pub mod builder;
pub mod dispatch;
pub mod lifecycle;
pub mod query;
pub mod status;

pub use self::builder::{App, AppBuilder, BuildError};
pub use self::dispatch::SpawnDispatcher;
pub use self::lifecycle::TicketService;
pub use self::query::{ListQuery, parse_priority_filter, parse_search, parse_status_filter};
pub use self::status::{Dashboard, ThreadEntry, TicketCounts, TicketDetail, TicketSummary};
