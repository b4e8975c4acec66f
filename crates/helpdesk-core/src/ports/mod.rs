//! Ports - seams to collaborators outside the core.
//!
//! - **TicketStore**: persistence (tickets, replies, users, departments)
//! - **MailTransport**: a single send attempt to a mail relay
//! - **NotificationDispatcher**: fire-and-forget scheduling of notifications
//! - **Clock**: time source

pub mod clock;
pub mod dispatch;
pub mod mail_transport;
pub mod ticket_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::dispatch::NotificationDispatcher;
pub use self::mail_transport::{MailTransport, OutgoingMail, TransportError};
pub use self::ticket_store::{StatusFilter, StoreError, TextSearch, TicketFilter, TicketStore};
