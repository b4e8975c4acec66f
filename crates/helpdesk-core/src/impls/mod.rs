//! Impls - implementations of the ports.
//!
//! # Included
//! - **InMemoryTicketStore**: development/test store
//! - **LogTransport**: mail transport that only logs
//! - **RecordingTransport**: mail transport for tests, with scripted failures
//! - **SmtpTransport**: delivery through an SMTP relay (STARTTLS, AUTH)
//! - **RecordingDispatcher**: captures notification events for tests
//!
//! A relational store plugs into the same `TicketStore` port.

pub mod dispatch;
pub mod inmem_store;
pub mod mail;
pub mod smtp;

pub use self::dispatch::RecordingDispatcher;
pub use self::inmem_store::InMemoryTicketStore;
pub use self::mail::{LogTransport, RecordingTransport};
pub use self::smtp::SmtpTransport;
