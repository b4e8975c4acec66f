//! SpawnDispatcher - one tokio task per notification.
//!
//! # Flow
//! 1. `dispatch()` mints a `DeliveryId` and spawns a task owning the event
//! 2. the task runs `Notifier::send` (with its internal retries)
//! 3. the outcome is logged; nothing is sent back to the caller
//!
//! There is no bound on concurrently running deliveries and no ordering
//! between two deliveries, even for the same ticket.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tracing::Instrument;

use crate::domain::{DeliveryId, NotificationEvent};
use crate::notify::Notifier;
use crate::ports::{Clock, NotificationDispatcher};

#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

/// Decrements the in-flight count when the delivery task ends, however it ends.
struct InFlightGuard(Arc<InFlight>);

impl InFlightGuard {
    fn enter(in_flight: Arc<InFlight>) -> Self {
        in_flight.count.fetch_add(1, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

pub struct SpawnDispatcher {
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
    in_flight: Arc<InFlight>,
}

impl SpawnDispatcher {
    pub fn new(notifier: Arc<Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifier,
            clock,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Deliveries spawned and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::SeqCst)
    }

    /// Wait until no delivery is running. Used to drain before shutdown.
    pub async fn wait_idle(&self) {
        loop {
            // Registered before the check so a wake-up in between is not lost.
            let idle = self.in_flight.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }
}

impl NotificationDispatcher for SpawnDispatcher {
    fn dispatch(&self, event: NotificationEvent) {
        let delivery_id = DeliveryId::generate(self.clock.as_ref());
        let template = event.template();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(
                %delivery_id,
                ticket_id = %event.ticket_id,
                ?template,
                "no async runtime; notification dropped"
            );
            return;
        };

        let guard = InFlightGuard::enter(Arc::clone(&self.in_flight));
        let notifier = Arc::clone(&self.notifier);
        let span = tracing::info_span!(
            "delivery",
            %delivery_id,
            ticket_id = %event.ticket_id,
            ?template
        );

        tracing::debug!(%delivery_id, ticket_id = %event.ticket_id, "notification dispatched");

        runtime.spawn(
            async move {
                let _guard = guard;
                match notifier.send(&event).await {
                    Ok(delivered) => {
                        tracing::info!(attempts = delivered.attempts, "notification delivered");
                    }
                    Err(error) => {
                        tracing::error!(%error, "notification failed");
                    }
                }
            }
            .instrument(span),
        );
    }
}
