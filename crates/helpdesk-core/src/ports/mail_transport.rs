//! MailTransport port - one logical send per call.
//!
//! Connection handling, STARTTLS upgrade and authentication are transport
//! policy. The notifier sees a single fallible operation and owns the retry.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("cannot reach mail relay: {0}")]
    Connect(String),

    #[error("mail relay rejected message: {0}")]
    Rejected(String),
}

/// Plain-text message ready for the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// Header block followed by a blank line and the body.
    pub fn to_message(&self) -> String {
        let headers = [
            ("From", self.from.clone()),
            ("To", self.to.join(",")),
            ("Subject", self.subject.clone()),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", "text/plain; charset=\"utf-8\"".to_string()),
        ];

        let mut message = String::new();
        for (name, value) in headers {
            message.push_str(name);
            message.push_str(": ");
            message.push_str(&value);
            message.push_str("\r\n");
        }
        message.push_str("\r\n");
        message.push_str(&self.body);
        message
    }
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportError>;
}
