//! Notifier - renders a notification and delivers it with bounded retry.
//!
//! The transport is one fallible call per attempt. The notifier retries up to
//! `RetryPolicy::max_attempts`, sleeping between attempts, and gives up with a
//! `DeliveryError` carrying the last transport error.

mod retry;
mod template;

pub use retry::RetryPolicy;
pub use template::{Confirmation, Rendered, ReplyNotice};

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{EventDetail, NotificationEvent};
use crate::ports::{MailTransport, OutgoingMail, TransportError};

/// Delivery gave up after exhausting its attempts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("mail to {} not delivered after {attempts} attempt(s)", .recipients.join(","))]
pub struct DeliveryError {
    pub attempts: u32,
    pub recipients: Vec<String>,
    #[source]
    pub last_error: TransportError,
}

/// Successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    /// Attempts used, including the one that succeeded.
    pub attempts: u32,
}

pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    from: String,
    retry: RetryPolicy,
}

impl Notifier {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            from: from.into(),
            retry,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Render and deliver an event snapshot with its template.
    pub async fn send(&self, event: &NotificationEvent) -> Result<Delivered, DeliveryError> {
        match &event.detail {
            EventDetail::TicketCreated {
                department_name,
                priority_label,
                description,
            } => {
                self.send_ticket_confirmation(&Confirmation {
                    to: &event.recipient,
                    owner_name: &event.owner_name,
                    title: &event.title,
                    ticket_id: event.ticket_id,
                    department_name,
                    priority_label,
                    status_label: &event.status_label,
                    description,
                })
                .await
            }
            EventDetail::ReplyAdded {
                message,
                replier_name,
            } => {
                self.send_ticket_reply(&ReplyNotice {
                    to: &event.recipient,
                    owner_name: &event.owner_name,
                    title: &event.title,
                    ticket_id: event.ticket_id,
                    status_label: &event.status_label,
                    reply_message: message,
                    replier_name,
                })
                .await
            }
        }
    }

    pub async fn send_ticket_confirmation(
        &self,
        notice: &Confirmation<'_>,
    ) -> Result<Delivered, DeliveryError> {
        let Rendered { subject, body } = notice.render();
        self.deliver(vec![notice.to.to_string()], subject, body).await
    }

    pub async fn send_ticket_reply(
        &self,
        notice: &ReplyNotice<'_>,
    ) -> Result<Delivered, DeliveryError> {
        let Rendered { subject, body } = notice.render();
        self.deliver(vec![notice.to.to_string()], subject, body).await
    }

    /// Send with retry. The delay between attempts is not cancellable.
    pub async fn deliver(
        &self,
        to: Vec<String>,
        subject: String,
        body: String,
    ) -> Result<Delivered, DeliveryError> {
        let mail = OutgoingMail {
            from: self.from.clone(),
            to,
            subject,
            body,
        };
        let max_attempts = self.retry.attempt_budget();

        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::info!(attempt, max_attempts, to = ?mail.to, "sending mail");

            let error = match self.transport.send(&mail).await {
                Ok(()) => {
                    tracing::info!(attempt, to = ?mail.to, "mail delivered");
                    return Ok(Delivered { attempts: attempt });
                }
                Err(error) => error,
            };

            tracing::warn!(attempt, to = ?mail.to, %error, "mail attempt failed");

            if attempt >= max_attempts {
                tracing::error!(attempts = attempt, to = ?mail.to, %error, "giving up on mail");
                return Err(DeliveryError {
                    attempts: attempt,
                    recipients: mail.to,
                    last_error: error,
                });
            }

            tokio::time::sleep(self.retry.next_delay(attempt)).await;
        }
    }
}
