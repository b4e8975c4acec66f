//! TicketService - the ticket lifecycle engine.
//!
//! Runs on the caller's task. Writes go to the store synchronously and their
//! errors are returned; only after a write succeeds is a notification handed
//! to the dispatcher, which never blocks or fails the call.
//!
//! # Visibility
//! A regular user only sees tickets they own: lookups are scoped by
//! `(id, owner)`, so someone else's ticket and a missing ticket both come back
//! as `TicketError::NotFound`. Staff lookups are unscoped.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{
    Department, EventDetail, LifecyclePolicy, NewReply, NewTicket, NotificationEvent, Ticket,
    TicketError, TicketForm, TicketId, TicketPriority, TicketReply, TicketResult, TicketStatus,
    User, UserId, department_name,
};
use crate::ports::{
    Clock, NotificationDispatcher, StatusFilter, StoreError, TicketFilter, TicketStore,
};

use super::query::ListQuery;
use super::status::{Dashboard, ThreadEntry, TicketCounts, TicketDetail, TicketSummary};

/// Tickets shown on the dashboard.
const RECENT_TICKETS: usize = 5;

pub struct TicketService {
    store: Arc<dyn TicketStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    policy: LifecyclePolicy,
}

impl TicketService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            store,
            dispatcher,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    /// Departments for the creation form, or `Setup` when there are none.
    ///
    /// Callers check this before showing the form; `create_ticket` does not
    /// repeat it, so a department deleted in between goes unnoticed.
    pub async fn ensure_departments_configured(&self) -> TicketResult<Vec<Department>> {
        let departments = self.store.list_departments().await?;
        if departments.is_empty() {
            tracing::warn!("ticket form requested but no department exists");
            return Err(TicketError::Setup);
        }
        Ok(departments)
    }

    pub async fn create_ticket(&self, owner: &User, form: &TicketForm) -> TicketResult<Ticket> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(TicketError::Validation(missing));
        }

        let new = NewTicket {
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            reply_to_email: form.reply_to_email.trim().to_string(),
            priority: TicketPriority::parse(&form.priority),
            owner_id: owner.id,
            department_id: form.department_id(),
            status: TicketStatus::Waiting,
            created_at: self.clock.now(),
        };

        let ticket = self
            .store
            .insert_ticket(new)
            .await
            .inspect_err(|error| {
                tracing::error!(%error, owner = %owner.id, "failed to create ticket");
            })?;

        let department = self.department_of(&ticket).await;

        self.dispatcher.dispatch(NotificationEvent {
            recipient: ticket.reply_to_email.clone(),
            owner_name: owner.display_name(),
            ticket_id: ticket.id,
            title: ticket.title.clone(),
            status_label: ticket.status_label().to_string(),
            detail: EventDetail::TicketCreated {
                department_name: department_name(department.as_ref()),
                priority_label: ticket.priority_label().to_string(),
                description: ticket.description.clone(),
            },
        });

        tracing::info!(ticket_id = %ticket.id, owner = %owner.username, "ticket created");
        Ok(ticket)
    }

    pub async fn add_reply(
        &self,
        ticket_id: TicketId,
        author: &User,
        message: &str,
    ) -> TicketResult<TicketReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(TicketError::Validation(vec!["message"]));
        }

        let ticket = self.visible_ticket(ticket_id, author).await?;
        if !self.policy.accepts_reply(ticket.status) {
            return Err(TicketError::Closed(ticket.id));
        }

        let reply = self
            .store
            .append_reply(NewReply {
                ticket_id: ticket.id,
                author_id: author.id,
                message: message.to_string(),
                created_at: self.clock.now(),
            })
            .await
            .map_err(not_found_if_missing)
            .inspect_err(|error| tracing::error!(%error, %ticket_id, "failed to create reply"))?;

        tracing::info!(%ticket_id, author = %author.username, "reply added");

        if author.id == ticket.owner_id {
            return Ok(reply);
        }

        match self.reply_event(&ticket, author, &reply).await {
            Some(event) => self.dispatcher.dispatch(event),
            None => tracing::warn!(%ticket_id, "no recipient for reply notification; skipped"),
        }
        Ok(reply)
    }

    /// The owner's tickets, newest first.
    pub async fn list_tickets(
        &self,
        owner: &User,
        query: &ListQuery,
    ) -> TicketResult<Vec<TicketSummary>> {
        let tickets = self.store.list_tickets(&query.to_filter(owner.id)).await?;
        self.summarize(tickets).await
    }

    /// Ticket with its thread, under the same visibility rule as replies.
    pub async fn ticket_detail(
        &self,
        viewer: &User,
        ticket_id: TicketId,
    ) -> TicketResult<TicketDetail> {
        let ticket = self.visible_ticket(ticket_id, viewer).await?;
        let department = self.department_of(&ticket).await;
        let replies = self.store.list_replies(ticket.id).await?;

        let mut names: HashMap<UserId, String> = HashMap::new();
        let mut thread = Vec::with_capacity(replies.len());
        for reply in replies {
            let author_name = match names.get(&reply.author_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.display_name_of(reply.author_id).await;
                    names.insert(reply.author_id, name.clone());
                    name
                }
            };
            thread.push(ThreadEntry { reply, author_name });
        }

        Ok(TicketDetail {
            department_name: department_name(department.as_ref()),
            status_label: ticket.status_label().to_string(),
            priority_label: ticket.priority_label().to_string(),
            ticket,
            replies: thread,
        })
    }

    /// Administrative status change. Non-staff callers get `NotFound`.
    pub async fn change_status(
        &self,
        actor: &User,
        ticket_id: TicketId,
        next: TicketStatus,
    ) -> TicketResult<Ticket> {
        if !actor.is_staff {
            return Err(TicketError::NotFound);
        }
        let ticket = self.visible_ticket(ticket_id, actor).await?;
        if !ticket.status.can_transition_to(next) {
            return Err(TicketError::InvalidTransition {
                from: ticket.status,
                to: next,
            });
        }

        self.store
            .update_status(ticket.id, next, self.clock.now())
            .await
            .map_err(not_found_if_missing)?;
        tracing::info!(
            %ticket_id,
            from = %ticket.status,
            to = %next,
            actor = %actor.username,
            "ticket status changed"
        );

        self.store
            .find_ticket(ticket.id, None)
            .await?
            .ok_or(TicketError::NotFound)
    }

    pub async fn dashboard(&self, owner: &User) -> TicketResult<Dashboard> {
        let base = TicketFilter::owned_by(owner.id);
        let count_in = |status| TicketFilter {
            status: StatusFilter::Is(status),
            ..base.clone()
        };

        let counts = TicketCounts {
            waiting: self.store.count_tickets(&count_in(TicketStatus::Waiting)).await?,
            in_progress: self.store.count_tickets(&count_in(TicketStatus::InProgress)).await?,
            closed: self.store.count_tickets(&count_in(TicketStatus::Closed)).await?,
            total: self.store.count_tickets(&base).await?,
        };

        let recent = self
            .store
            .list_tickets(&TicketFilter {
                limit: Some(RECENT_TICKETS),
                ..base.clone()
            })
            .await?;

        Ok(Dashboard {
            counts,
            recent: self.summarize(recent).await?,
        })
    }

    async fn visible_ticket(&self, ticket_id: TicketId, user: &User) -> TicketResult<Ticket> {
        let scope = (!user.is_staff).then_some(user.id);
        self.store
            .find_ticket(ticket_id, scope)
            .await?
            .ok_or(TicketError::NotFound)
    }

    /// Best effort: a failed lookup is logged and shown as unassigned.
    async fn department_of(&self, ticket: &Ticket) -> Option<Department> {
        let id = ticket.department_id?;
        match self.store.find_department(id).await {
            Ok(department) => department,
            Err(error) => {
                tracing::warn!(%error, ticket_id = %ticket.id, "department lookup failed");
                None
            }
        }
    }

    async fn display_name_of(&self, user_id: UserId) -> String {
        match self.store.find_user(user_id).await {
            Ok(Some(user)) => user.display_name(),
            Ok(None) => user_id.to_string(),
            Err(error) => {
                tracing::warn!(%error, user = %user_id, "user lookup failed");
                user_id.to_string()
            }
        }
    }

    /// Reply snapshot for the ticket owner. Recipient is the ticket's
    /// reply-to address, or the owner's account email when that is blank.
    async fn reply_event(
        &self,
        ticket: &Ticket,
        replier: &User,
        reply: &TicketReply,
    ) -> Option<NotificationEvent> {
        let owner = match self.store.find_user(ticket.owner_id).await {
            Ok(owner) => owner,
            Err(error) => {
                tracing::warn!(%error, ticket_id = %ticket.id, "owner lookup failed");
                None
            }
        };

        let recipient = if ticket.reply_to_email.trim().is_empty() {
            owner.as_ref().map(|o| o.email.clone())?
        } else {
            ticket.reply_to_email.clone()
        };
        if recipient.trim().is_empty() {
            return None;
        }

        let owner_name = owner
            .as_ref()
            .map(User::display_name)
            .unwrap_or_else(|| recipient.clone());

        Some(NotificationEvent {
            recipient,
            owner_name,
            ticket_id: ticket.id,
            title: ticket.title.clone(),
            status_label: ticket.status_label().to_string(),
            detail: EventDetail::ReplyAdded {
                message: reply.message.clone(),
                replier_name: replier.display_name(),
            },
        })
    }

    async fn summarize(&self, tickets: Vec<Ticket>) -> TicketResult<Vec<TicketSummary>> {
        let departments: HashMap<_, _> = match self.store.list_departments().await {
            Ok(all) => all.into_iter().map(|d| (d.id, d)).collect(),
            Err(error) => {
                tracing::warn!(%error, "department lookup failed");
                HashMap::new()
            }
        };

        let mut summaries = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let department = ticket.department_id.and_then(|id| departments.get(&id));
            summaries.push(TicketSummary {
                department_name: department_name(department),
                status_label: ticket.status_label().to_string(),
                priority_label: ticket.priority_label().to_string(),
                reply_count: self.store.count_replies(ticket.id).await?,
                ticket,
            });
        }
        Ok(summaries)
    }
}

/// A row that vanished between lookup and write reads as not found.
fn not_found_if_missing(error: StoreError) -> TicketError {
    match error {
        StoreError::Missing { .. } => TicketError::NotFound,
        other => TicketError::Persistence(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UNASSIGNED_DEPARTMENT;
    use crate::impls::{InMemoryTicketStore, RecordingDispatcher};
    use crate::ports::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    struct Fixture {
        store: InMemoryTicketStore,
        dispatcher: RecordingDispatcher,
        clock: Arc<FixedClock>,
        service: TicketService,
        owner: User,
        other: User,
        staff: User,
        staff2: User,
    }

    fn user(id: u64, username: &str, first: &str, is_staff: bool) -> User {
        User {
            id: UserId::new(id),
            username: username.into(),
            email: format!("{username}@example.com"),
            first_name: first.into(),
            last_name: String::new(),
            is_staff,
        }
    }

    async fn fixture_with(policy: LifecyclePolicy) -> Fixture {
        let store = InMemoryTicketStore::new();
        let dispatcher = RecordingDispatcher::new();
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));

        let owner = user(1, "budi", "Budi", false);
        let other = user(2, "ani", "Ani", false);
        let staff = user(10, "sari", "Sari", true);
        let staff2 = user(11, "joko", "Joko", true);
        for u in [&owner, &other, &staff, &staff2] {
            store.put_user(u.clone()).await;
        }

        let service = TicketService::new(
            Arc::new(store.clone()),
            Arc::new(dispatcher.clone()),
            clock.clone(),
            policy,
        );

        Fixture {
            store,
            dispatcher,
            clock,
            service,
            owner,
            other,
            staff,
            staff2,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(LifecyclePolicy::default()).await
    }

    fn printer_form() -> TicketForm {
        TicketForm {
            title: "Printer issue".into(),
            description: "Won't turn on".into(),
            reply_to_email: "a@b.com".into(),
            priority: "HIGH".into(),
            department: String::new(),
        }
    }

    fn form(title: &str, description: &str) -> TicketForm {
        TicketForm {
            title: title.into(),
            description: description.into(),
            reply_to_email: "a@b.com".into(),
            ..TicketForm::default()
        }
    }

    // ── create_ticket ──

    #[tokio::test]
    async fn create_ticket_scenario_without_department() {
        let f = fixture().await;
        f.store.add_department("IT").await;

        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        assert_eq!(ticket.status, TicketStatus::Waiting);
        assert_eq!(ticket.priority, TicketPriority::High);
        assert_eq!(ticket.owner_id, f.owner.id);
        assert_eq!(ticket.created_at, f.clock.now());

        let detail = f.service.ticket_detail(&f.owner, ticket.id).await.unwrap();
        assert_eq!(detail.reply_count(), 0);

        let events = f.dispatcher.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.template(), crate::domain::TemplateKind::Confirmation);
        assert_eq!(event.recipient, "a@b.com");
        assert_eq!(event.owner_name, "Budi ");
        assert_eq!(event.status_label, "Menunggu Balasan");
        assert_eq!(
            event.detail,
            EventDetail::TicketCreated {
                department_name: UNASSIGNED_DEPARTMENT.into(),
                priority_label: "High".into(),
                description: "Won't turn on".into(),
            }
        );
    }

    #[tokio::test]
    async fn create_ticket_resolves_department_name() {
        let f = fixture().await;
        let it = f.store.add_department("IT").await;

        let mut form = printer_form();
        form.department = it.id.get().to_string();
        let ticket = f.service.create_ticket(&f.owner, &form).await.unwrap();

        assert_eq!(ticket.department_id, Some(it.id));
        match &f.dispatcher.events()[0].detail {
            EventDetail::TicketCreated { department_name, .. } => assert_eq!(department_name, "IT"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_department_id_is_kept_and_shown_unassigned() {
        let f = fixture().await;
        let mut form = printer_form();
        form.department = "99".into();

        let ticket = f.service.create_ticket(&f.owner, &form).await.unwrap();
        assert_eq!(ticket.department_id, Some(crate::domain::DepartmentId::new(99)));

        let detail = f.service.ticket_detail(&f.owner, ticket.id).await.unwrap();
        assert_eq!(detail.department_name, UNASSIGNED_DEPARTMENT);
    }

    #[tokio::test]
    async fn blank_priority_defaults_to_medium_and_unknown_is_kept() {
        let f = fixture().await;

        let ticket = f.service.create_ticket(&f.owner, &form("a", "b")).await.unwrap();
        assert_eq!(ticket.priority, TicketPriority::Medium);

        let mut urgent = form("a", "b");
        urgent.priority = "URGENT".into();
        let ticket = f.service.create_ticket(&f.owner, &urgent).await.unwrap();
        assert_eq!(ticket.priority.code(), "URGENT");
        assert_eq!(ticket.priority_label(), "URGENT");
    }

    #[tokio::test]
    async fn create_ticket_rejects_blank_fields_without_persisting() {
        let f = fixture().await;
        let cases = [
            TicketForm {
                title: "  ".into(),
                ..printer_form()
            },
            TicketForm {
                description: String::new(),
                ..printer_form()
            },
            TicketForm {
                reply_to_email: "\t".into(),
                ..printer_form()
            },
        ];

        for form in cases {
            let err = f.service.create_ticket(&f.owner, &form).await.unwrap_err();
            assert!(matches!(err, TicketError::Validation(_)), "{err}");
        }

        let all = TicketFilter::owned_by(f.owner.id);
        assert_eq!(f.store.count_tickets(&all).await.unwrap(), 0);
        assert!(f.dispatcher.events().is_empty());
    }

    #[tokio::test]
    async fn store_failure_on_create_propagates_and_dispatches_nothing() {
        let f = fixture().await;
        f.store.set_offline(true);

        let err = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap_err();

        assert!(matches!(err, TicketError::Persistence(StoreError::Unavailable(_))));
        assert!(f.dispatcher.events().is_empty());
    }

    #[tokio::test]
    async fn department_lookup_failure_shows_unassigned() {
        let f = fixture().await;
        let it = f.store.add_department("IT").await;
        f.store.set_departments_offline(true);

        let mut form = printer_form();
        form.department = it.id.get().to_string();
        let ticket = f.service.create_ticket(&f.owner, &form).await.unwrap();
        assert_eq!(ticket.department_id, Some(it.id));

        let events = f.dispatcher.events();
        assert_eq!(events.len(), 1);
        match &events[0].detail {
            EventDetail::TicketCreated {
                department_name, ..
            } => assert_eq!(department_name, UNASSIGNED_DEPARTMENT),
            other => panic!("unexpected event {other:?}"),
        }

        let rows = f.service.list_tickets(&f.owner, &ListQuery::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].department_name, UNASSIGNED_DEPARTMENT);

        let detail = f.service.ticket_detail(&f.owner, ticket.id).await.unwrap();
        assert_eq!(detail.department_name, UNASSIGNED_DEPARTMENT);

        f.store.set_departments_offline(false);
        let rows = f.service.list_tickets(&f.owner, &ListQuery::default()).await.unwrap();
        assert_eq!(rows[0].department_name, "IT");
    }

    #[tokio::test]
    async fn setup_error_when_no_department_exists() {
        let f = fixture().await;
        let err = f.service.ensure_departments_configured().await.unwrap_err();
        assert!(matches!(err, TicketError::Setup));

        f.store.add_department("IT").await;
        let departments = f.service.ensure_departments_configured().await.unwrap();
        assert_eq!(departments.len(), 1);
    }

    // ── add_reply ──

    #[tokio::test]
    async fn owner_reply_sends_no_notification() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        let reply = f.service.add_reply(ticket.id, &f.owner, "any update?").await.unwrap();

        assert_eq!(reply.author_id, f.owner.id);
        assert_eq!(f.dispatcher.events().len(), 1, "only the confirmation");
    }

    #[tokio::test]
    async fn staff_reply_notifies_reply_to_address() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        f.service
            .add_reply(ticket.id, &f.staff, "Please check the cable.")
            .await
            .unwrap();

        let events = f.dispatcher.events();
        assert_eq!(events.len(), 2);
        let event = &events[1];
        assert_eq!(event.recipient, "a@b.com");
        assert_eq!(event.owner_name, "Budi ");
        assert_eq!(event.ticket_id, ticket.id);
        assert_eq!(
            event.detail,
            EventDetail::ReplyAdded {
                message: "Please check the cable.".into(),
                replier_name: "Sari ".into(),
            }
        );
    }

    #[tokio::test]
    async fn blank_reply_to_falls_back_to_owner_email() {
        let f = fixture().await;
        // Legacy row: created before reply-to was mandatory.
        let ticket = f
            .store
            .insert_ticket(NewTicket {
                title: "Old".into(),
                description: "legacy".into(),
                reply_to_email: String::new(),
                priority: TicketPriority::Low,
                owner_id: f.owner.id,
                department_id: None,
                status: TicketStatus::Waiting,
                created_at: f.clock.now(),
            })
            .await
            .unwrap();

        f.service.add_reply(ticket.id, &f.staff, "hi").await.unwrap();

        let events = f.dispatcher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipient, "budi@example.com");
    }

    #[tokio::test]
    async fn reply_to_foreign_or_missing_ticket_is_the_same_not_found() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        let foreign = f.service.add_reply(ticket.id, &f.other, "hi").await.unwrap_err();
        let missing = f.service.add_reply(TicketId::new(999), &f.other, "hi").await.unwrap_err();

        assert!(matches!(foreign, TicketError::NotFound));
        assert!(matches!(missing, TicketError::NotFound));
        assert_eq!(foreign.to_string(), missing.to_string());
        assert_eq!(f.store.count_replies(ticket.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_reply_is_rejected() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        let err = f.service.add_reply(ticket.id, &f.staff, "   ").await.unwrap_err();
        assert!(matches!(err, TicketError::Validation(ref fields) if fields == &vec!["message"]));
    }

    #[tokio::test]
    async fn reply_store_failure_propagates_before_any_dispatch() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();
        f.store.set_offline(true);

        let err = f.service.add_reply(ticket.id, &f.staff, "hi").await.unwrap_err();

        assert!(matches!(err, TicketError::Persistence(_)));
        assert_eq!(f.dispatcher.events().len(), 1);
    }

    #[tokio::test]
    async fn two_staff_replies_dispatch_twice_and_keep_order() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        f.clock.advance(Duration::minutes(1));
        f.service.add_reply(ticket.id, &f.staff, "first").await.unwrap();
        f.clock.advance(Duration::minutes(1));
        f.service.add_reply(ticket.id, &f.staff2, "second").await.unwrap();

        let replies: Vec<_> = f
            .dispatcher
            .events()
            .into_iter()
            .filter_map(|e| match e.detail {
                EventDetail::ReplyAdded { message, .. } => Some(message),
                EventDetail::TicketCreated { .. } => None,
            })
            .collect();
        assert_eq!(replies, vec!["first".to_string(), "second".to_string()]);

        let detail = f.service.ticket_detail(&f.owner, ticket.id).await.unwrap();
        let thread: Vec<_> = detail
            .replies
            .iter()
            .map(|e| (e.reply.message.as_str(), e.author_name.as_str()))
            .collect();
        assert_eq!(thread, vec![("first", "Sari "), ("second", "Joko ")]);
        assert_eq!(detail.ticket.updated_at, f.clock.now());
    }

    #[tokio::test]
    async fn closed_ticket_accepts_replies_by_default() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();
        f.service.change_status(&f.staff, ticket.id, TicketStatus::InProgress).await.unwrap();
        f.service.change_status(&f.staff, ticket.id, TicketStatus::Closed).await.unwrap();

        f.service.add_reply(ticket.id, &f.staff, "reopened?").await.unwrap();

        let last = f.dispatcher.events().pop().unwrap();
        assert_eq!(last.status_label, "Closed");
    }

    #[tokio::test]
    async fn strict_policy_rejects_replies_on_closed_ticket() {
        let f = fixture_with(LifecyclePolicy::strict()).await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();
        f.service.change_status(&f.staff, ticket.id, TicketStatus::InProgress).await.unwrap();
        f.service.change_status(&f.staff, ticket.id, TicketStatus::Closed).await.unwrap();

        let err = f.service.add_reply(ticket.id, &f.owner, "hello?").await.unwrap_err();
        assert!(matches!(err, TicketError::Closed(id) if id == ticket.id));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_delivery_does_not_fail_the_reply() {
        use crate::app::SpawnDispatcher;
        use crate::impls::RecordingTransport;
        use crate::notify::{Notifier, RetryPolicy};
        use crate::ports::TransportError;

        let f = fixture().await;
        let transport = RecordingTransport::new();
        transport.fail_always(TransportError::Connect("relay down".into()));
        let notifier = Notifier::new(
            Arc::new(transport.clone()),
            "support@example.com",
            RetryPolicy::fixed(3, std::time::Duration::from_secs(2)),
        );
        let dispatcher = Arc::new(SpawnDispatcher::new(Arc::new(notifier), f.clock.clone()));
        let service = TicketService::new(
            Arc::new(f.store.clone()),
            dispatcher.clone(),
            f.clock.clone(),
            LifecyclePolicy::default(),
        );

        let ticket = service.create_ticket(&f.owner, &printer_form()).await.unwrap();
        let reply = service.add_reply(ticket.id, &f.staff, "on it").await.unwrap();
        assert_eq!(reply.message, "on it");

        dispatcher.wait_idle().await;
        assert_eq!(transport.attempts().len(), 6);
        assert!(transport.delivered().is_empty());
        assert_eq!(f.store.count_replies(ticket.id).await.unwrap(), 1);
    }

    // ── change_status ──

    #[tokio::test]
    async fn status_moves_forward_only() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        let err = f
            .service
            .change_status(&f.staff, ticket.id, TicketStatus::Closed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TicketError::InvalidTransition {
                from: TicketStatus::Waiting,
                to: TicketStatus::Closed
            }
        ));

        f.clock.advance(Duration::minutes(3));
        let updated = f
            .service
            .change_status(&f.staff, ticket.id, TicketStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated.status, TicketStatus::InProgress);
        assert_eq!(updated.updated_at, f.clock.now());

        f.service.change_status(&f.staff, ticket.id, TicketStatus::Closed).await.unwrap();
        let err = f
            .service
            .change_status(&f.staff, ticket.id, TicketStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn non_staff_cannot_change_status() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        let err = f
            .service
            .change_status(&f.owner, ticket.id, TicketStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::NotFound));
    }

    // ── list_tickets / dashboard ──

    #[tokio::test]
    async fn numeric_search_matches_id_but_text_search_does_not() {
        let f = fixture().await;
        for i in 1..=42 {
            f.service
                .create_ticket(&f.owner, &form(&format!("Ticket {i}"), "nothing"))
                .await
                .unwrap();
        }
        // Ids and titles drift apart once another user's ticket exists.
        f.service.create_ticket(&f.other, &form("x", "y")).await.unwrap();
        let target = f
            .service
            .create_ticket(&f.owner, &form("Printer", "Won't turn on"))
            .await
            .unwrap();
        assert_eq!(target.id, TicketId::new(44));

        let hits = f
            .service
            .list_tickets(&f.owner, &ListQuery::default().search("44"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].ticket.id, target.id);

        let hits = f
            .service
            .list_tickets(&f.owner, &ListQuery::default().search("abc"))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn listing_is_owner_scoped_newest_first_with_reply_counts() {
        let f = fixture().await;
        let first = f.service.create_ticket(&f.owner, &form("first", "d")).await.unwrap();
        f.clock.advance(Duration::minutes(1));
        let second = f.service.create_ticket(&f.owner, &form("second", "d")).await.unwrap();
        f.service.create_ticket(&f.other, &form("foreign", "d")).await.unwrap();
        f.service.add_reply(first.id, &f.staff, "hi").await.unwrap();

        let rows = f.service.list_tickets(&f.owner, &ListQuery::default()).await.unwrap();

        let ids: Vec<_> = rows.iter().map(|r| r.ticket.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(rows[1].reply_count, 1);
        assert_eq!(rows[0].status_label, "Menunggu Balasan");
        assert_eq!(rows[0].department_name, UNASSIGNED_DEPARTMENT);
    }

    #[tokio::test]
    async fn status_and_priority_filters() {
        let f = fixture().await;
        let high = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();
        let medium = f.service.create_ticket(&f.owner, &form("m", "d")).await.unwrap();
        f.service.change_status(&f.staff, medium.id, TicketStatus::InProgress).await.unwrap();

        let ids = |rows: Vec<TicketSummary>| {
            rows.into_iter().map(|r| r.ticket.id).collect::<Vec<_>>()
        };

        let open = f
            .service
            .list_tickets(&f.owner, &ListQuery::default().status("open"))
            .await
            .unwrap();
        assert_eq!(ids(open), vec![high.id]);

        let in_progress = f
            .service
            .list_tickets(&f.owner, &ListQuery::default().status("in_progress"))
            .await
            .unwrap();
        assert_eq!(ids(in_progress), vec![medium.id]);

        let by_priority = f
            .service
            .list_tickets(&f.owner, &ListQuery::default().status("all").priority("HIGH"))
            .await
            .unwrap();
        assert_eq!(ids(by_priority), vec![high.id]);

        // Unrecognised status value matches nothing.
        let bogus = f
            .service
            .list_tickets(&f.owner, &ListQuery::default().status("pending"))
            .await
            .unwrap();
        assert!(bogus.is_empty());
    }

    #[tokio::test]
    async fn empty_status_and_priority_list_everything() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        for query in [
            ListQuery::default().status(""),
            ListQuery::default().priority(""),
            ListQuery::default().search("").status("").priority(""),
        ] {
            let rows = f.service.list_tickets(&f.owner, &query).await.unwrap();
            assert_eq!(rows.len(), 1, "{query:?}");
            assert_eq!(rows[0].ticket.id, ticket.id);
        }
    }

    #[tokio::test]
    async fn staff_can_view_any_ticket_others_cannot() {
        let f = fixture().await;
        let ticket = f.service.create_ticket(&f.owner, &printer_form()).await.unwrap();

        assert!(f.service.ticket_detail(&f.staff, ticket.id).await.is_ok());
        assert!(matches!(
            f.service.ticket_detail(&f.other, ticket.id).await,
            Err(TicketError::NotFound)
        ));
    }

    #[tokio::test]
    async fn dashboard_counts_and_recent() {
        let f = fixture().await;
        let mut created = Vec::new();
        for i in 0..7 {
            f.clock.advance(Duration::minutes(1));
            created.push(
                f.service
                    .create_ticket(&f.owner, &form(&format!("t{i}"), "d"))
                    .await
                    .unwrap(),
            );
        }
        f.service.change_status(&f.staff, created[0].id, TicketStatus::InProgress).await.unwrap();
        f.service.change_status(&f.staff, created[1].id, TicketStatus::InProgress).await.unwrap();
        f.service.change_status(&f.staff, created[1].id, TicketStatus::Closed).await.unwrap();
        f.service.create_ticket(&f.other, &form("foreign", "d")).await.unwrap();

        let dashboard = f.service.dashboard(&f.owner).await.unwrap();

        assert_eq!(
            dashboard.counts,
            TicketCounts {
                waiting: 5,
                in_progress: 1,
                closed: 1,
                total: 7,
            }
        );
        assert_eq!(dashboard.recent.len(), RECENT_TICKETS);
        assert_eq!(dashboard.recent[0].ticket.id, created[6].id);
    }
}
