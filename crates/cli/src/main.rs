use clap::{Parser, Subcommand};
use lookup_core::{
    config::{BASE_URL_ENV, CONNECT_TIMEOUT_ENV, REQUEST_TIMEOUT_ENV},
    AttentionPage, DocumentNumber, HttpLookupClient, LookupConfig, NotificationEvent,
    NotificationScope, Person, Workbench,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lookup")]
#[command(about = "Person and attention lookup CLI")]
struct Cli {
    /// Lookup service base URL (overrides LOOKUP_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search persons by document number
    Search {
        /// Document number
        ndoc: String,
    },
    /// List attentions for the person with this document number
    Attentions {
        /// Document number
        ndoc: String,
        /// Year to query (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Case-insensitive item code filter
        #[arg(long, default_value = "")]
        filter: String,
        /// Rows per page (13, 25 or 50)
        #[arg(long)]
        page_size: Option<usize>,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lookup=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = LookupConfig::from_values(
        cli.base_url.or_else(|| std::env::var(BASE_URL_ENV).ok()),
        std::env::var(CONNECT_TIMEOUT_ENV).ok(),
        std::env::var(REQUEST_TIMEOUT_ENV).ok(),
    )?;
    tracing::debug!(base_url = cfg.base_url(), "lookup service configured");
    let client = Arc::new(HttpLookupClient::new(cfg)?);
    let mut workbench = Workbench::new(client);

    match cli.command {
        Some(Commands::Search { ndoc }) => {
            let persons = workbench.search(&ndoc).await;
            print_persons(&persons);
            print_notification(workbench.notification(NotificationScope::PrimarySearch));
        }
        Some(Commands::Attentions {
            ndoc,
            year,
            filter,
            page_size,
            page,
        }) => {
            workbench.search(&ndoc).await;
            if let Some(note) = workbench.notification(NotificationScope::PrimarySearch) {
                print_notification(Some(note));
                return Ok(());
            }

            let document_number = DocumentNumber::new(&ndoc)?;
            if let Err(e) = workbench.select(&document_number) {
                tracing::warn!(ndoc = %document_number, "cannot open attentions: {}", e);
                eprintln!("Error opening attentions: {}", e);
                return Ok(());
            }
            if let Some(year) = year {
                workbench.set_year(year)?;
            }
            workbench.set_filter(&filter)?;
            if let Some(page_size) = page_size {
                workbench.set_page_size(page_size)?;
            }
            workbench.set_page(page.saturating_sub(1))?;

            workbench.refresh_attentions().await;

            if let Some(current) = workbench.current_page() {
                print_attentions(&current);
            }
            print_notification(workbench.notification(NotificationScope::DetailSession));
        }
        None => {
            println!("Use 'lookup --help' for commands");
        }
    }

    Ok(())
}

fn print_persons(persons: &[Person]) {
    for person in persons {
        println!(
            "{}  born {}  gender {}  age {}",
            person.label(),
            person.birth_date,
            person.gender,
            person.age_text()
        );
    }
}

fn print_attentions(page: &AttentionPage) {
    for event in &page.items {
        println!(
            "{:<10} {:<10} {:<8} {:<40} {}",
            event.visit_id, event.visit_date, event.item_code, event.item_description, event.facility
        );
    }
    println!(
        "page {}/{}  ({} shown of {} fetched)",
        page.index + 1,
        page.count,
        page.total_visible,
        page.total_raw
    );
}

fn print_notification(note: Option<&NotificationEvent>) {
    if let Some(note) = note {
        println!("[{}] {}", note.severity, note.message);
    }
}
