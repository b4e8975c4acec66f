//! Domain identifiers (strongly-typed IDs).
//!
//! Ticket, reply, user and department ids are all opaque numbers assigned by
//! the store. They share one generic `Id<T>` so a `TicketId` can never be
//! passed where a `UserId` is expected, while the marker type costs nothing
//! at runtime.
//!
//! Delivery ids are different: they are minted by the dispatcher, not the
//! store, and use ULIDs so log lines of one delivery sequence sort by time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

use crate::ports::Clock;

/// Marker trait for each id kind.
pub trait IdMarker: Send + Sync + 'static {
    /// Prefix used by `Display` (e.g. "ticket-").
    fn prefix() -> &'static str;
}

/// Store-assigned numeric id.
#[repr(transparent)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn get(self) -> u64 {
        self.value
    }
}

// Manual impls: derives would put the bounds on `T`, which is an empty enum.
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

impl<T: IdMarker> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

// ========================================
// Marker types
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ticket {}

impl IdMarker for Ticket {
    fn prefix() -> &'static str {
        "ticket-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reply {}

impl IdMarker for Reply {
    fn prefix() -> &'static str {
        "reply-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum User {}

impl IdMarker for User {
    fn prefix() -> &'static str {
        "user-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Department {}

impl IdMarker for Department {
    fn prefix() -> &'static str {
        "dept-"
    }
}

pub type TicketId = Id<Ticket>;
pub type ReplyId = Id<Reply>;
pub type UserId = Id<User>;
pub type DepartmentId = Id<Department>;

/// Correlation id for one dispatched notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeliveryId(Ulid);

impl DeliveryId {
    /// Mint a new id whose timestamp part comes from `clock`.
    pub fn generate(clock: &dyn Clock) -> Self {
        let timestamp_ms = clock.now().timestamp_millis().max(0) as u64;
        Self(Ulid::from_parts(timestamp_ms, rand::random()))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delivery-{}", self.0)
    }
}
