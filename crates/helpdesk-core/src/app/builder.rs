//! AppBuilder - wiring of the portal from its ports.
//!
//! Validates at startup: a missing store or transport, or an unusable sender
//! address, fails `build()` instead of surfacing on the first request.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::notify::Notifier;
use crate::ports::{Clock, MailTransport, SystemClock, TicketStore};

use super::dispatch::SpawnDispatcher;
use super::lifecycle::TicketService;

/// Builds an [`App`].
///
/// ```ignore
/// let app = AppBuilder::new()
///     .store(InMemoryTicketStore::new())
///     .transport(LogTransport::new(config.mail.relay()))
///     .config(config)
///     .build()?;
/// ```
pub struct AppBuilder {
    store: Option<Arc<dyn TicketStore>>,
    transport: Option<Arc<dyn MailTransport>>,
    clock: Arc<dyn Clock>,
    config: PortalConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no ticket store configured")]
    MissingStore,

    #[error("no mail transport configured")]
    MissingTransport,

    #[error("invalid sender address {0:?}")]
    InvalidSender(String),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            transport: None,
            clock: Arc::new(SystemClock),
            config: PortalConfig::default(),
        }
    }

    pub fn store(mut self, store: impl TicketStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn transport(mut self, transport: impl MailTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: PortalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let transport = self.transport.ok_or(BuildError::MissingTransport)?;

        let from = self.config.mail.from.trim();
        if !is_plausible_address(from) {
            return Err(BuildError::InvalidSender(self.config.mail.from.clone()));
        }

        let notifier = Arc::new(Notifier::new(transport, from, self.config.retry.clone()));
        let dispatcher = Arc::new(SpawnDispatcher::new(notifier, Arc::clone(&self.clock)));
        let tickets = TicketService::new(
            store,
            dispatcher.clone(),
            self.clock,
            self.config.lifecycle,
        );

        tracing::info!(
            app = %self.config.app_name,
            relay = %self.config.mail.relay(),
            max_attempts = self.config.retry.max_attempts,
            "portal assembled"
        );

        Ok(App {
            name: self.config.app_name,
            tickets,
            dispatcher,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Something shaped like `local@domain`.
fn is_plausible_address(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !address.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// The assembled portal.
pub struct App {
    pub name: String,
    pub tickets: TicketService,
    dispatcher: Arc<SpawnDispatcher>,
}

impl App {
    /// Notifications still being delivered.
    pub fn pending_notifications(&self) -> usize {
        self.dispatcher.in_flight()
    }

    /// Wait for in-flight notifications before the process exits.
    pub async fn shutdown(self) {
        let pending = self.dispatcher.in_flight();
        if pending > 0 {
            tracing::info!(pending, "waiting for notifications to finish");
        }
        self.dispatcher.wait_idle().await;
        tracing::info!("shutdown complete");
    }
}
