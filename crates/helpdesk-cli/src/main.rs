use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use helpdesk_core::domain::{TicketForm, TicketStatus, User, UserId};
use helpdesk_core::impls::{InMemoryTicketStore, LogTransport, SmtpTransport};
use helpdesk_core::{AppBuilder, Delivery, ListQuery, PortalConfig};

fn user(id: u64, username: &str, first: &str, last: &str, is_staff: bool) -> User {
    User {
        id: UserId::new(id),
        username: username.into(),
        email: format!("{username}@example.com"),
        first_name: first.into(),
        last_name: last.into(),
        is_staff,
    }
}

/// Walks one ticket through its lifecycle against the in-memory store.
/// Notifications go to the SMTP relay when one is configured (`EMAIL_HOST`
/// or `EMAIL_TRANSPORT=smtp`), to the log otherwise.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PortalConfig::from_env().context("loading configuration")?;

    // (A) Reference data normally owned by the admin side
    let store = InMemoryTicketStore::new();
    let owner = user(1, "budi", "Budi", "Santoso", false);
    let staff = user(2, "sari", "Sari", "Wulandari", true);
    store.put_user(owner.clone()).await;
    store.put_user(staff.clone()).await;
    let it = store.add_department("IT").await;
    store.add_department("Finance").await;

    let builder = AppBuilder::new().store(store);
    let builder = match config.mail.delivery {
        Delivery::Smtp => {
            let smtp = SmtpTransport::from_config(&config.mail).context("configuring SMTP relay")?;
            tracing::info!(relay = %config.mail.relay(), "mail goes to SMTP relay");
            builder.transport(smtp)
        }
        Delivery::Log => builder.transport(LogTransport::new(config.mail.relay())),
    };
    let app = builder.config(config).build()?;
    tracing::info!(app = %app.name, "starting demo");
    let tickets = &app.tickets;

    // (B) The creation form is only offered once departments exist
    let departments = tickets.ensure_departments_configured().await?;
    println!("departments: {}", serde_json::to_string(&departments)?);

    // (C) Owner opens a ticket, staff answers, owner follows up
    let ticket = tickets
        .create_ticket(
            &owner,
            &TicketForm {
                title: "Printer issue".into(),
                description: "Won't turn on".into(),
                reply_to_email: "budi.santoso@example.com".into(),
                priority: "HIGH".into(),
                department: it.id.get().to_string(),
            },
        )
        .await?;
    println!("created: {} ({})", ticket.id, ticket.status_label());

    tickets
        .add_reply(ticket.id, &staff, "Please check that the power cable is seated.")
        .await?;
    tickets
        .add_reply(ticket.id, &owner, "It was loose, works now. Thanks!")
        .await?;

    // (D) Staff works the ticket to completion
    tickets
        .change_status(&staff, ticket.id, TicketStatus::InProgress)
        .await?;
    let closed = tickets
        .change_status(&staff, ticket.id, TicketStatus::Closed)
        .await?;
    println!("status: {}", closed.status_label());

    // (E) Owner views
    let listing = tickets
        .list_tickets(&owner, &ListQuery::default().search("Printer").status("closed"))
        .await?;
    println!("listing: {}", serde_json::to_string_pretty(&listing)?);

    let detail = tickets.ticket_detail(&owner, ticket.id).await?;
    println!("thread: {}", serde_json::to_string_pretty(&detail.replies)?);

    let dashboard = tickets.dashboard(&owner).await?;
    println!("dashboard: {}", serde_json::to_string_pretty(&dashboard.counts)?);

    // (F) Let queued notifications finish before exiting
    app.shutdown().await;
    Ok(())
}
