//! InMemoryTicketStore - development and test store.
//!
//! One `tokio::sync::Mutex` guards all tables, so every trait call is atomic
//! on its own (a reply insert and its `updated_at` bump cannot interleave
//! with another reply). Nothing spans two calls.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    Department, DepartmentId, NewReply, NewTicket, ReplyId, Ticket, TicketId, TicketReply,
    TicketStatus, User, UserId,
};
use crate::ports::{StoreError, TicketFilter, TicketStore};

struct InMemoryStoreState {
    /// Keyed by id so iteration is in insertion order.
    tickets: BTreeMap<TicketId, Ticket>,

    replies: BTreeMap<ReplyId, TicketReply>,

    users: HashMap<UserId, User>,

    departments: BTreeMap<DepartmentId, Department>,

    next_ticket_id: u64,
    next_reply_id: u64,
    next_department_id: u64,
}

impl InMemoryStoreState {
    fn new() -> Self {
        Self {
            tickets: BTreeMap::new(),
            replies: BTreeMap::new(),
            users: HashMap::new(),
            departments: BTreeMap::new(),
            next_ticket_id: 1,
            next_reply_id: 1,
            next_department_id: 1,
        }
    }

    fn allocate_ticket_id(&mut self) -> TicketId {
        let id = TicketId::new(self.next_ticket_id);
        self.next_ticket_id += 1;
        id
    }

    fn allocate_reply_id(&mut self) -> ReplyId {
        let id = ReplyId::new(self.next_reply_id);
        self.next_reply_id += 1;
        id
    }

    fn allocate_department_id(&mut self) -> DepartmentId {
        let id = DepartmentId::new(self.next_department_id);
        self.next_department_id += 1;
        id
    }

    fn live_ticket_mut(&mut self, id: TicketId) -> Result<&mut Ticket, StoreError> {
        self.tickets
            .get_mut(&id)
            .filter(|t| t.deleted_at.is_none())
            .ok_or(StoreError::Missing {
                entity: "ticket",
                id: id.get(),
            })
    }

    fn matching(&self, filter: &TicketFilter) -> Vec<&Ticket> {
        self.tickets.values().filter(|t| filter.matches(t)).collect()
    }
}

/// In-memory `TicketStore`.
#[derive(Clone)]
pub struct InMemoryTicketStore {
    state: Arc<Mutex<InMemoryStoreState>>,
    offline: Arc<AtomicBool>,
    departments_offline: Arc<AtomicBool>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryStoreState::new())),
            offline: Arc::new(AtomicBool::new(false)),
            departments_offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate an outage: every call fails with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail only the department lookups; tickets, replies and users keep
    /// working.
    pub fn set_departments_offline(&self, offline: bool) {
        self.departments_offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }

    fn check_departments_online(&self) -> Result<(), StoreError> {
        self.check_online()?;
        if self.departments_offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("department table is offline".into()));
        }
        Ok(())
    }

    /// Seed a user (accounts are managed outside the core).
    pub async fn put_user(&self, user: User) {
        let mut state = self.state.lock().await;
        state.users.insert(user.id, user);
    }

    /// Seed a department; names are unique so an existing one is returned.
    pub async fn add_department(&self, name: impl Into<String>) -> Department {
        let name = name.into();
        let mut state = self.state.lock().await;
        if let Some(existing) = state.departments.values().find(|d| d.name == name) {
            return existing.clone();
        }
        let id = state.allocate_department_id();
        let department = Department { id, name };
        state.departments.insert(id, department.clone());
        department
    }

    pub async fn remove_department(&self, id: DepartmentId) -> Option<Department> {
        let mut state = self.state.lock().await;
        state.departments.remove(&id)
    }
}

impl Default for InMemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn insert_ticket(&self, new: NewTicket) -> Result<Ticket, StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let id = state.allocate_ticket_id();
        let ticket = Ticket {
            id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            reply_to_email: new.reply_to_email,
            owner_id: new.owner_id,
            department_id: new.department_id,
            created_at: new.created_at,
            updated_at: new.created_at,
            deleted_at: None,
        };
        state.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn find_ticket(
        &self,
        id: TicketId,
        owner: Option<UserId>,
    ) -> Result<Option<Ticket>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state
            .tickets
            .get(&id)
            .filter(|t| t.deleted_at.is_none())
            .filter(|t| owner.is_none_or(|owner| owner == t.owner_id))
            .cloned())
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        let mut tickets: Vec<Ticket> = state.matching(filter).into_iter().cloned().collect();
        // Newest first; id breaks ties between identical timestamps.
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit {
            tickets.truncate(limit);
        }
        Ok(tickets)
    }

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<usize, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state.matching(filter).len())
    }

    async fn update_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let ticket = state.live_ticket_mut(id)?;
        ticket.status = status;
        ticket.updated_at = ticket.updated_at.max(at);
        Ok(())
    }

    async fn soft_delete_ticket(&self, id: TicketId, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let ticket = state.live_ticket_mut(id)?;
        ticket.deleted_at = Some(at);
        Ok(())
    }

    async fn append_reply(&self, new: NewReply) -> Result<TicketReply, StoreError> {
        self.check_online()?;
        let mut state = self.state.lock().await;

        let ticket = state.live_ticket_mut(new.ticket_id)?;
        ticket.updated_at = ticket.updated_at.max(new.created_at);

        let id = state.allocate_reply_id();
        let reply = TicketReply {
            id,
            ticket_id: new.ticket_id,
            author_id: new.author_id,
            message: new.message,
            created_at: new.created_at,
        };
        state.replies.insert(id, reply.clone());
        Ok(reply)
    }

    async fn list_replies(&self, ticket_id: TicketId) -> Result<Vec<TicketReply>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        let mut replies: Vec<TicketReply> = state
            .replies
            .values()
            .filter(|r| r.ticket_id == ticket_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        replies.sort_by_key(|r| r.created_at);
        Ok(replies)
    }

    async fn count_replies(&self, ticket_id: TicketId) -> Result<usize, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state
            .replies
            .values()
            .filter(|r| r.ticket_id == ticket_id)
            .count())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_department(&self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        self.check_departments_online()?;
        let state = self.state.lock().await;
        Ok(state.departments.get(&id).cloned())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        self.check_departments_online()?;
        let state = self.state.lock().await;
        Ok(state.departments.values().cloned().collect())
    }
}
