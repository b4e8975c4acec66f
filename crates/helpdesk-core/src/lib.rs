//! helpdesk-core
//!
//! Support ticket lifecycle with e-mail notification of the ticket owner.
//!
//! # Modules
//! - **domain**: tickets, replies, users, status machine, events, errors
//! - **ports**: TicketStore, MailTransport, NotificationDispatcher, Clock
//! - **notify**: mail templates and delivery with bounded retry
//! - **app**: builder, lifecycle engine, dispatcher, read models
//! - **impls**: in-memory store and test/dev transports
//! - **config**: environment-driven settings

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod notify;
pub mod ports;

pub use app::{App, AppBuilder, ListQuery, TicketService};
pub use config::{ConfigError, Delivery, MailConfig, PortalConfig};
pub use domain::{TicketError, TicketResult};
