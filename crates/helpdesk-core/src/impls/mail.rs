//! Development mail transports.
//!
//! - **LogTransport**: writes each message to the log instead of a relay
//! - **RecordingTransport**: keeps every attempt in memory and can be told to
//!   fail, for exercising the retry path

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{MailTransport, OutgoingMail, TransportError};

/// Logs messages at `info` and always succeeds.
#[derive(Debug, Clone)]
pub struct LogTransport {
    relay: String,
}

impl LogTransport {
    /// `relay` is only used to label log lines (e.g. "smtp.example.com:587").
    pub fn new(relay: impl Into<String>) -> Self {
        Self {
            relay: relay.into(),
        }
    }
}

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportError> {
        tracing::info!(
            relay = %self.relay,
            to = ?mail.to,
            subject = %mail.subject,
            "mail relayed (log transport)"
        );
        tracing::debug!(message = %mail.to_message(), "mail content");
        Ok(())
    }
}

#[derive(Default)]
struct Recorded {
    attempts: Vec<OutgoingMail>,
    delivered: Vec<OutgoingMail>,
    /// Scripted failures, consumed front to back before any success.
    failures: VecDeque<TransportError>,
    always_fail: Option<TransportError>,
}

/// Records attempts; clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` attempts with a connection error.
    pub fn fail_next(&self, n: usize) {
        let mut inner = self.lock();
        for i in 0..n {
            inner
                .failures
                .push_back(TransportError::Connect(format!("scripted failure {}", i + 1)));
        }
    }

    /// Fail every attempt from now on with `error`.
    pub fn fail_always(&self, error: TransportError) {
        self.lock().always_fail = Some(error);
    }

    /// Every attempt, successful or not, in call order.
    pub fn attempts(&self) -> Vec<OutgoingMail> {
        self.lock().attempts.clone()
    }

    /// Messages that were accepted.
    pub fn delivered(&self) -> Vec<OutgoingMail> {
        self.lock().delivered.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportError> {
        let mut inner = self.lock();
        inner.attempts.push(mail.clone());

        if let Some(error) = inner.always_fail.clone() {
            return Err(error);
        }
        if let Some(error) = inner.failures.pop_front() {
            return Err(error);
        }
        inner.delivered.push(mail.clone());
        Ok(())
    }
}
