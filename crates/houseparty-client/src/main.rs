use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use houseparty_client::auth::watcher::{spawn_session_watcher, spawn_state_feed};
use houseparty_client::models::SessionState;
use houseparty_client::services::catalog::{self, CatalogView};
use houseparty_client::services::checkout::BrowserCheckout;
use houseparty_client::services::profile::load_profile;
use houseparty_client::{
    db, ApiClient, AuthClient, BookingOrchestrator, Config, PurchaseOutcome, SessionStore,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "House Party tickets from the terminal")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account (log in afterwards)
    Register {
        name: String,
        email: String,
        password: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Show who is signed in
    Whoami,
    /// List upcoming events
    Events {
        /// Expand the details of one event
        #[arg(long)]
        details: Option<String>,
    },
    /// Buy tickets for an event
    Book {
        title: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Show your tickets grouped by event
    Profile,
    /// Follow sign-in changes, including ones made by other terminals
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("houseparty_client=info,houseparty=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let pool = db::create_pool(&config.session_db_path)
        .with_context(|| format!("opening session storage at {}", config.session_db_path))?;
    let store = SessionStore::open(pool);
    let api = ApiClient::new(&config)?;
    let auth = AuthClient::new(api.clone(), store.clone());

    match args.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            auth.register(&name, &email, &password).await?;
            println!("Account created, please sign in.");
        }
        Command::Login { email, password } => {
            let session = auth.login(&email, &password).await?;
            let name = session.user().map(|u| u.display_name()).unwrap_or_default();
            println!("Signed in as {name}");
        }
        Command::Logout => {
            auth.logout()?;
            println!("Signed out.");
        }
        Command::Whoami => print_state(&store.state()),
        Command::Events { details } => {
            let mut view = CatalogView::default();
            if let Some(title) = details {
                view.toggle_details(&title);
            }
            for event in catalog::events() {
                println!(
                    "[{}] {} ({} - {})",
                    event.status, event.title, event.date, event.price
                );
                println!("    {}", event.description);
                if view.is_expanded(event) {
                    println!("    {}", event.details);
                }
            }
        }
        Command::Book { title, quantity } => {
            let event = catalog::find_event(&title)
                .with_context(|| format!("no event named {title:?}"))?;
            let widget = BrowserCheckout::new(config.checkout_port)
                .with_announce(|url| println!("Open {url} in your browser to pay."));
            let mut booking = BookingOrchestrator::new(api, store, Arc::new(widget))
                .with_branding(config.brand_name.clone(), config.theme_color.clone());

            match booking.book_event(event, quantity).await? {
                PurchaseOutcome::Booked(tickets) => {
                    let ids: Vec<String> = tickets
                        .iter()
                        .filter_map(|t| t.id.as_ref().map(ToString::to_string))
                        .collect();
                    println!(
                        "Payment successful, {} ticket(s) booked for {}: {}",
                        tickets.len(),
                        event.title,
                        ids.join(", ")
                    );
                }
                PurchaseOutcome::Abandoned => println!("Checkout closed, nothing was booked."),
            }
        }
        Command::Profile => {
            let profile = load_profile(&api, &store).await?;
            println!("{}", profile.user.display_name());
            if let Some(email) = profile.user.email() {
                println!("{email}");
            }
            if profile.tickets.is_empty() {
                println!("You have no tickets yet.");
            }
            for group in &profile.tickets {
                println!(
                    "{} ({}): {} x tickets, total {}, booked {}",
                    group.event_title,
                    group.event_date.as_deref().unwrap_or("Date not set"),
                    group.count,
                    group.total_price,
                    group.latest_created_at.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Watch => {
            let _watcher = spawn_session_watcher(store.clone(), config.session_watch_interval)?;
            let mut feed = spawn_state_feed(store);
            loop {
                print_state(&feed.borrow_and_update());
                tokio::select! {
                    changed = feed.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
    }

    Ok(())
}

fn print_state(state: &SessionState) {
    match state {
        SessionState::Loading => println!("Checking authentication..."),
        SessionState::LoggedOut => println!("Not signed in."),
        SessionState::LoggedIn(user) => println!(
            "[{}] {} <{}>",
            user.initials(),
            user.display_name(),
            user.email().unwrap_or("")
        ),
    }
}
