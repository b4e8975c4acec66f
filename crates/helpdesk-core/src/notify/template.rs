//! Templates - plain-text notification mails, in Indonesian.
//!
//! Each template is a borrowed view over an event snapshot and renders to a
//! subject and body; nothing here touches the network or the clock, so the
//! same input always renders the same mail.
//!
//! Subjects carry the ticket id (`[Ticket ID: 42] ...`, replies prefixed
//! `RE: `) so mail clients thread them per ticket.

use crate::domain::TicketId;

/// Fields of the "ticket created" mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation<'a> {
    pub to: &'a str,
    pub owner_name: &'a str,
    pub title: &'a str,
    pub ticket_id: TicketId,
    pub department_name: &'a str,
    pub priority_label: &'a str,
    pub status_label: &'a str,
    pub description: &'a str,
}

/// Fields of the "support replied" mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyNotice<'a> {
    pub to: &'a str,
    pub owner_name: &'a str,
    pub title: &'a str,
    pub ticket_id: TicketId,
    pub status_label: &'a str,
    pub reply_message: &'a str,
    pub replier_name: &'a str,
}

/// Rendered subject and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

impl Confirmation<'_> {
    pub fn render(&self) -> Rendered {
        let id = self.ticket_id.get();
        let subject = format!("[Ticket ID: {id}] {}", self.title);
        let body = format!(
            "Halo {owner},\n\
             \n\
             Terima kasih telah menghubungi kami. Tiket Anda telah berhasil dibuat \
             dengan rincian berikut:\n\
             \n\
             ID Tiket  : {id}\n\
             Judul     : {title}\n\
             Departemen: {department}\n\
             Prioritas : {priority}\n\
             Status    : {status}\n\
             \n\
             Deskripsi:\n\
             {description}\n\
             \n\
             ---\n\
             Tim support kami akan segera meninjau tiket Anda.\n\
             Mohon menunggu balasan dari tim support melalui email ini.\n\
             \n\
             Salam,\n\
             Tim Support",
            owner = self.owner_name,
            title = self.title,
            department = self.department_name,
            priority = self.priority_label,
            status = self.status_label,
            description = self.description,
        );
        Rendered { subject, body }
    }
}

impl ReplyNotice<'_> {
    pub fn render(&self) -> Rendered {
        let id = self.ticket_id.get();
        let subject = format!("RE: [Ticket ID: {id}] {}", self.title);
        let body = format!(
            "Halo {owner},\n\
             \n\
             Tim support kami ({replier}) telah membalas tiket Anda:\n\
             \n\
             ---\n\
             {message}\n\
             ---\n\
             \n\
             Detail Tiket:\n\
             \n\
             ID Tiket    : {id}\n\
             Judul       : {title}\n\
             Status      : {status}\n\
             \n\
             Silakan balas email ini jika ada pertanyaan tambahan.\n\
             \n\
             Salam,\n\
             {replier}\n\
             Tim Support",
            owner = self.owner_name,
            replier = self.replier_name,
            message = self.reply_message,
            title = self.title,
            status = self.status_label,
        );
        Rendered { subject, body }
    }
}
