use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lookup_core::config::{BASE_URL_ENV, CONNECT_TIMEOUT_ENV, REQUEST_TIMEOUT_ENV};
use lookup_core::{HttpLookupClient, LookupConfig, SharedWorkbench, Workbench};

mod console;

/// Main entry point for the interactive lookup console
///
/// Reads operator commands from stdin and renders the workbench state to
/// stdout. Lookups run as local tasks on a single thread, so the console keeps
/// accepting commands while a query is in flight.
///
/// # Environment Variables
/// - `LOOKUP_API_BASE_URL`: lookup service base URL (default: "http://localhost:8000")
/// - `LOOKUP_CONNECT_TIMEOUT_SECS`: connect timeout (default: 5)
/// - `LOOKUP_REQUEST_TIMEOUT_SECS`: whole-request timeout (default: 30)
///
/// # Errors
/// Returns an error if the configuration is invalid, the HTTP client cannot be
/// built or stdin cannot be read.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lookup_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = LookupConfig::from_values(
        std::env::var(BASE_URL_ENV).ok(),
        std::env::var(CONNECT_TIMEOUT_ENV).ok(),
        std::env::var(REQUEST_TIMEOUT_ENV).ok(),
    )?;

    tracing::info!("-- Starting lookup console against {}", cfg.base_url());

    let client = Arc::new(HttpLookupClient::new(cfg)?);
    let shared = SharedWorkbench::new(Workbench::new(client));

    let local = tokio::task::LocalSet::new();
    local.run_until(console::run(shared)).await
}
