//! SmtpTransport - delivery through an SMTP relay.
//!
//! # Session (one per `send`)
//! 1. plain TCP connect to `host:port`
//! 2. STARTTLS when the relay offers it, plain session otherwise
//! 3. AUTH when both user and password are configured
//! 4. MAIL FROM / RCPT TO / DATA, then QUIT
//!
//! Retrying is the notifier's job; a failed session is reported once.
//!
//! # Error mapping
//! - the relay answered with a 4xx/5xx reply → `TransportError::Rejected`
//! - anything before a reply (DNS, TCP, TLS, timeout) → `TransportError::Connect`
//! - a sender or recipient that is not a mailbox → `TransportError::Rejected`,
//!   without opening a connection

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::ports::{MailTransport, OutgoingMail, TransportError};

/// Upper bound for each SMTP command round trip.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SmtpTransport {
    relay: String,
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn from_config(config: &MailConfig) -> Result<Self, TransportError> {
        let tls = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| TransportError::Connect(format!("tls setup for {}: {e}", config.host)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(Tls::Opportunistic(tls))
            .timeout(Some(COMMAND_TIMEOUT));
        if let Some((user, password)) = config.credentials() {
            builder = builder.credentials(Credentials::new(user.to_string(), password.to_string()));
        }

        if config.accept_invalid_certs {
            tracing::warn!(relay = %config.relay(), "certificate verification disabled");
        }

        Ok(Self {
            relay: config.relay(),
            inner: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportError> {
        let message = build_message(mail)?;
        let response = self.inner.send(message).await.map_err(classify)?;
        tracing::debug!(relay = %self.relay, code = %response.code(), "relay accepted message");
        Ok(())
    }
}

/// Plain-text UTF-8 message with From/To/Subject; lettre adds the MIME headers.
fn build_message(mail: &OutgoingMail) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(mailbox(&mail.from)?)
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    for to in &mail.to {
        builder = builder.to(mailbox(to)?);
    }
    builder
        .body(mail.body.clone())
        .map_err(|e| TransportError::Rejected(format!("malformed message: {e}")))
}

fn mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .parse()
        .map_err(|e| TransportError::Rejected(format!("bad address {address:?}: {e}")))
}

fn classify(error: smtp::Error) -> TransportError {
    if error.is_permanent() || error.is_transient() {
        TransportError::Rejected(error.to_string())
    } else {
        TransportError::Connect(error.to_string())
    }
}
