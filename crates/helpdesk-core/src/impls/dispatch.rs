//! RecordingDispatcher - captures events instead of delivering them.
//!
//! Lets lifecycle tests assert exactly which notifications were scheduled
//! without running a transport.

use std::sync::{Arc, Mutex};

use crate::domain::NotificationEvent;
use crate::ports::NotificationDispatcher;

#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn dispatch(&self, event: NotificationEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
