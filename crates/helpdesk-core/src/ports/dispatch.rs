//! NotificationDispatcher port - hands an event off without waiting.

use crate::domain::NotificationEvent;

/// Schedules delivery of one notification.
///
/// `dispatch` returns before any delivery attempt happens and reports
/// nothing back; the outcome only reaches the operational log.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, event: NotificationEvent);
}
