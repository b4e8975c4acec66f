//! Domain model (ids, tickets, replies, users, status machine, events, errors).

pub mod errors;
pub mod events;
pub mod ids;
pub mod party;
pub mod reply;
pub mod state;
pub mod ticket;

pub use errors::{TicketError, TicketResult};
pub use events::{EventDetail, NotificationEvent, TemplateKind};
pub use ids::{DeliveryId, DepartmentId, ReplyId, TicketId, UserId};
pub use party::{Department, UNASSIGNED_DEPARTMENT, User, department_name};
pub use reply::{NewReply, TicketReply};
pub use state::LifecyclePolicy;
pub use ticket::{NewTicket, Ticket, TicketForm, TicketPriority, TicketStatus, status_label};
