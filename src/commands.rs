//! CLI command implementations.
//!
//! Each command is one "screen": it validates its form locally, calls
//! the gateway, and renders its own success and error output. There is
//! no shared error boundary; the gateway's typed errors carry enough
//! classification for each screen to speak for itself.

use crate::access::{self, EditAccess, GuardDecision};
use crate::api::types::{
    EventInput, EventQuery, EventStatus, GoogleAuthRequest, ProfileUpdate, RegisterRequest,
};
use crate::api::ApiClient;
use crate::config::Config;
use crate::dashboard;
use crate::reports;
use crate::session::identity::{Identity, LocalRecord, SessionStore};
use crate::session::notifier::spawn_session_poller;
use crate::session::reconciler::ProviderClaims;
use crate::validate::{self, EventForm, FieldError, RegistrationForm};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "eventbuddy", version, about = "EventBuddy platform client")]
pub struct Cli {
    /// Override the backend API base URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
    },
    /// Sign in with a Google identity token.
    LoginGoogle {
        /// OAuth identity token to exchange.
        #[arg(long)]
        token: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Account role: user or host.
        #[arg(long, default_value = "user")]
        role: String,
        #[arg(long)]
        location: String,
    },
    /// Sign out and clear all session state.
    Logout,
    /// Show the signed-in identity and its navigation.
    Whoami,
    /// Browse and manage events.
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },
    /// Personal dashboard with aggregated statistics.
    Dashboard,
    /// Role-scoped payment history.
    Payments {
        /// Write the history as CSV to this path.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// View or update the profile.
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Watch session changes until interrupted.
    Watch,
    /// Check whether the backend is reachable.
    Ping,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List events, optionally filtered.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// open | closed | cancelled | completed
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one event with participants and reviews.
    Show { id: String },
    /// Create an event (hosts and admins).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Schedule date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value_t = 10)]
        capacity: u32,
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
    },
    /// Edit an event you own (admins may edit any).
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long)]
        fee: Option<f64>,
    },
    /// Events you joined.
    Joined,
    /// Events you created.
    Mine,
    /// Events hosted by a given host.
    Hosted { host_id: String },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Fetch the current profile from the backend.
    Show,
    /// Update name and/or location.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
}

/// Shared per-invocation context.
struct App {
    config: Config,
    store: Arc<SessionStore>,
    api: ApiClient,
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    let store = Arc::new(SessionStore::open(&config.state_dir)?);
    let api = ApiClient::new(&config, store.clone())?;
    let app = App { config, store, api };

    match cli.command {
        Command::Login { email } => login(&app, &email).await,
        Command::LoginGoogle { token, email, name } => login_google(&app, token, email, name).await,
        Command::Register {
            name,
            email,
            role,
            location,
        } => register(&app, name, email, role, location).await,
        Command::Logout => logout(&app),
        Command::Whoami => whoami(&app),
        Command::Events { command } => events(&app, command).await,
        Command::Dashboard => show_dashboard(&app).await,
        Command::Payments { export } => payments(&app, export.as_deref()).await,
        Command::Profile { command } => profile(&app, command).await,
        Command::Watch => watch(&app).await,
        Command::Ping => ping(&app).await,
    }
}

async fn ping(app: &App) -> Result<()> {
    if app.api.health_check().await {
        println!("backend is reachable at {}", app.config.api_url);
        Ok(())
    } else {
        bail!("cannot connect to the server at {}", app.config.api_url)
    }
}

// ── Auth screens ─────────────────────────────────────────────────

async fn login(app: &App, email: &str) -> Result<()> {
    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()?;
    report_field_errors(&validate::validate_login(email, &password))?;

    let auth = app.api.login(email, &password).await?;
    let record = LocalRecord::from(auth.user);
    app.store.login(&record, &auth.token)?;
    println!("signed in as {} ({})", record.name, record.role.map(|r| r.as_str()).unwrap_or("user"));
    Ok(())
}

async fn login_google(app: &App, token: String, email: String, name: String) -> Result<()> {
    // The provider session is recorded first, like the OAuth callback
    // would. If the backend exchange below fails, this is the state the
    // reconciler sees: a minimal provider identity until the next 401
    // forces a clean re-login.
    app.store.set_provider_session(&ProviderClaims {
        name: name.clone(),
        email: email.clone(),
    })?;

    let request = GoogleAuthRequest { token, email, name };
    let auth = app.api.google_exchange(&request).await?;
    let record = LocalRecord::from(auth.user);
    app.store.login(&record, &auth.token)?;
    println!("signed in as {} via Google", record.name);
    Ok(())
}

async fn register(app: &App, name: String, email: String, role: String, location: String) -> Result<()> {
    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()?;
    let confirm = dialoguer::Password::new()
        .with_prompt("Confirm password")
        .interact()?;

    let form = RegistrationForm {
        name,
        email,
        password,
        confirm_password: confirm,
        role,
        location,
    };
    report_field_errors(&validate::validate_registration(&form))?;

    let request = RegisterRequest {
        name: form.name,
        email: form.email,
        password: form.password,
        role: form.role,
        location: form.location,
    };
    let auth = app.api.register(&request).await?;
    let record = LocalRecord::from(auth.user);
    app.store.login(&record, &auth.token)?;
    println!("account created, signed in as {}", record.name);
    Ok(())
}

fn logout(app: &App) -> Result<()> {
    app.store.logout()?;
    println!("signed out");
    Ok(())
}

fn whoami(app: &App) -> Result<()> {
    match app.store.current_identity() {
        Some(identity) => {
            println!("{} <{}> role={}", identity.name, identity.email, identity.role);
            if identity.token.is_none() {
                println!("note: no backend token; requests will be unauthenticated");
            }
            println!("navigation:");
            for entry in access::navigation(Some(&identity)) {
                println!("  - {}", entry.label());
            }
        }
        None => {
            println!("not signed in");
            for entry in access::navigation(None) {
                println!("  - {}", entry.label());
            }
        }
    }
    Ok(())
}

// ── Event screens ────────────────────────────────────────────────

async fn events(app: &App, command: EventsCommand) -> Result<()> {
    match command {
        EventsCommand::List {
            search,
            category,
            status,
            page,
        } => {
            let status = match status {
                Some(raw) => Some(
                    EventStatus::parse(&raw)
                        .ok_or_else(|| anyhow::anyhow!("unknown status '{raw}'"))?,
                ),
                None => None,
            };
            let query = EventQuery {
                search,
                category,
                status,
                page,
            };
            let events = app.api.events(&query).await?;
            print_event_list(&events);
            Ok(())
        }
        EventsCommand::Show { id } => {
            let event = app.api.event(&id).await?;
            print_event_detail(&event);
            Ok(())
        }
        EventsCommand::Create {
            title,
            description,
            category,
            date,
            location,
            capacity,
            fee,
        } => {
            let form = EventForm {
                title,
                description,
                category,
                date,
                location,
                capacity,
                fee,
            };
            create_event(app, form).await
        }
        EventsCommand::Edit {
            id,
            title,
            description,
            category,
            date,
            location,
            capacity,
            fee,
        } => {
            edit_event(
                app, &id, title, description, category, date, location, capacity, fee,
            )
            .await
        }
        EventsCommand::Joined => {
            require_identity(app)?;
            let events = app.api.joined_events().await?;
            print_event_list(&events);
            Ok(())
        }
        EventsCommand::Mine => {
            require_identity(app)?;
            let events = app.api.my_events().await?;
            print_event_list(&events);
            Ok(())
        }
        EventsCommand::Hosted { host_id } => {
            let events = app.api.host_events(&host_id).await?;
            print_event_list(&events);
            Ok(())
        }
    }
}

async fn create_event(app: &App, form: EventForm) -> Result<()> {
    match access::guard_event_authoring(app.store.current_identity().as_ref()) {
        GuardDecision::Allow => {}
        GuardDecision::RedirectLogin => bail!("sign in to create events"),
        GuardDecision::RedirectDashboard => bail!("only hosts can create events"),
    }

    let today = chrono::Local::now().date_naive();
    report_field_errors(&validate::validate_event_form(&form, today))?;
    let input = event_input(&form)?;

    let event = app.api.create_event(&input).await?;
    println!("created event {} ({})", event.title, event.id);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn edit_event(
    app: &App,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    date: Option<String>,
    location: Option<String>,
    capacity: Option<u32>,
    fee: Option<f64>,
) -> Result<()> {
    let identity = match access::guard_event_authoring(app.store.current_identity().as_ref()) {
        GuardDecision::Allow => require_identity(app)?,
        GuardDecision::RedirectLogin => bail!("sign in to edit events"),
        GuardDecision::RedirectDashboard => bail!("only hosts can edit events"),
    };

    let existing = app.api.event(id).await?;
    if access::guard_event_edit(&identity, &existing) == EditAccess::NotAuthorized {
        // Inline denial, matching the edit screen's behavior
        println!("not authorized: this event belongs to another host");
        return Ok(());
    }

    let form = EventForm {
        title: title.unwrap_or(existing.title),
        description: description.unwrap_or(existing.description),
        category: category.unwrap_or(existing.category),
        date: date.unwrap_or_else(|| existing.date.to_string()),
        location: location.unwrap_or(existing.location),
        capacity: capacity.unwrap_or(existing.capacity),
        fee: fee.unwrap_or(existing.fee),
    };
    let today = chrono::Local::now().date_naive();
    report_field_errors(&validate::validate_event_form(&form, today))?;
    let input = event_input(&form)?;

    let updated = app.api.update_event(id, &input).await?;
    println!("updated event {} ({})", updated.title, updated.id);
    Ok(())
}

// ── Dashboard / payments / profile ───────────────────────────────

async fn show_dashboard(app: &App) -> Result<()> {
    let identity = require_identity(app)?;
    let joined = app.api.joined_events().await?;
    let hosted = if access::can_author_events(identity.role) {
        app.api.my_events().await?
    } else {
        Vec::new()
    };

    let today = chrono::Local::now().date_naive();
    let stats = dashboard::compute_stats(&joined, &hosted, today);
    println!("dashboard for {} ({})", identity.name, identity.role);
    println!("  joined events:   {}", stats.joined);
    println!("  upcoming (30d):  {}", stats.upcoming);
    println!("  attended:        {}", stats.attended);
    if access::can_author_events(identity.role) {
        println!("  hosted events:   {}", stats.hosted);
    }
    println!("  fees paid:       {:.2}", stats.fees_paid);

    let upcoming = dashboard::upcoming_events(&joined, today);
    if !upcoming.is_empty() {
        println!("upcoming:");
        for event in upcoming {
            println!("  {}  {}  ({})", event.date, event.title, event.location);
        }
    }
    Ok(())
}

async fn payments(app: &App, export: Option<&std::path::Path>) -> Result<()> {
    let identity = require_identity(app)?;
    let records = app.api.succeeded_payments(identity.role).await?;

    match export {
        Some(path) => {
            reports::write_csv(&records, path)?;
            println!("exported {} payments to {}", records.len(), path.display());
        }
        None => print!("{}", reports::render_table(&records)),
    }
    Ok(())
}

async fn profile(app: &App, command: ProfileCommand) -> Result<()> {
    match command {
        ProfileCommand::Show => {
            let profile = app.api.me().await?;
            println!("{} <{}>", profile.name, profile.email);
            println!("role:     {}", profile.role);
            if let Some(location) = &profile.location {
                println!("location: {location}");
            }
        }
        ProfileCommand::Update { name, location } => {
            if name.is_none() && location.is_none() {
                bail!("nothing to update; pass --name and/or --location");
            }
            let update = ProfileUpdate { name, location };
            let profile = app.api.update_profile(&update).await?;
            // Keep the local record in step with the backend
            if app.store.current_identity().is_some() {
                app.store.update_identity(&LocalRecord::from(profile.clone()))?;
            }
            println!("profile updated: {} <{}>", profile.name, profile.email);
        }
    }
    Ok(())
}

// ── Session watch ────────────────────────────────────────────────

async fn watch(app: &App) -> Result<()> {
    let notifier = app.store.notifier();
    let mut rx = notifier.subscribe();
    let poller = spawn_session_poller(
        app.store.clone(),
        Duration::from_secs(app.config.poll_interval_secs.max(1)),
    );
    println!(
        "watching session state every {}s (ctrl-c to stop)",
        app.config.poll_interval_secs.max(1)
    );

    loop {
        match rx.recv().await {
            Ok(signal) => {
                let who = app
                    .store
                    .current_identity()
                    .map(|identity| format!("{} ({})", identity.name, identity.role))
                    .unwrap_or_else(|| "nobody".to_string());
                println!("{signal:?}: now signed in as {who}");
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "session watch lagged; re-reading state");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
    poller.abort();
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────

fn require_identity(app: &App) -> Result<Identity> {
    app.store
        .current_identity()
        .ok_or_else(|| anyhow::anyhow!("not signed in; run `eventbuddy login` first"))
}

fn report_field_errors(errors: &[FieldError]) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    for error in errors {
        eprintln!("  {}: {}", error.field, error.message);
    }
    bail!("validation failed; nothing was submitted")
}

fn event_input(form: &EventForm) -> Result<EventInput> {
    let date = form
        .parsed_date()
        .ok_or_else(|| anyhow::anyhow!("date must be YYYY-MM-DD"))?;
    Ok(EventInput {
        title: form.title.trim().to_string(),
        description: form.description.clone(),
        category: form.category.clone(),
        date,
        location: form.location.clone(),
        capacity: form.capacity,
        fee: form.fee,
    })
}

fn print_event_list(events: &[crate::api::types::Event]) {
    if events.is_empty() {
        println!("no events found");
        return;
    }
    for event in events {
        println!(
            "{}  {}  [{}]  {}  {}/{} joined  fee {:.2}",
            event.id,
            event.date,
            event.status.as_str(),
            event.title,
            event.attendee_count,
            event.capacity,
            event.fee,
        );
    }
}

fn print_event_detail(event: &crate::api::types::Event) {
    println!("{} ({})", event.title, event.id);
    println!("  date:      {}", event.date);
    println!("  status:    {}", event.status.as_str());
    println!("  category:  {}", event.category);
    println!("  location:  {}", event.location);
    println!("  host:      {} ({})", event.host.name, event.host.id);
    println!("  attending: {}/{}", event.attendee_count, event.capacity);
    println!("  fee:       {:.2}", event.fee);
    if !event.description.is_empty() {
        println!("  {}", event.description);
    }
    if !event.participants.is_empty() {
        println!("participants:");
        for participant in &event.participants {
            println!("  - {} <{}>", participant.name, participant.email);
        }
    }
    if !event.reviews.is_empty() {
        println!("reviews:");
        for review in &event.reviews {
            println!("  {}/5 {}: {}", review.rating, review.author, review.comment);
        }
    }
}
