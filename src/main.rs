use std::sync::Arc;

use jdias::alert::LogAlerts;
use jdias::config::ClientConfig;
use jdias::events::EventBus;
use jdias::modal::Dismissal;
use jdias::rest::RestClient;
use jdias::{DialogServices, OpenedDialog, PersonPopup, PersonPopupService, RouteParams};
use tokio::sync::watch;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

// Usage: jdias [--save] [PERSON_ID]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let mut save = false;
    let mut params = RouteParams::new();
    for arg in std::env::args().skip(1) {
        if arg == "--save" {
            save = true;
        } else {
            params.insert("id".into(), arg);
        }
    }

    let cfg = ClientConfig::from_env();
    info!("API base URL: {}", cfg.api_base_url);
    info!("Bearer token configured: {}", cfg.auth_token.is_some());

    let client = Arc::new(RestClient::new(&cfg)?);
    let events = EventBus::new(cfg.event_capacity);
    let mut list_events = events.subscribe();
    let service = Arc::new(PersonPopupService::new(
        DialogServices::from_backend(client),
        Arc::new(LogAlerts),
        events,
    ));

    // single activation: the subscription ends after the first open
    let (route_tx, route_rx) = watch::channel(params);
    drop(route_tx);
    let (mut popup, mut opened) = PersonPopup::init(route_rx, service);

    let Some(OpenedDialog { mut dialog, modal }) = opened.recv().await else {
        popup.destroy();
        anyhow::bail!("person dialog could not be opened");
    };

    info!(
        "Loaded {} conversations, {} profile candidates, {} account deletion candidates",
        dialog.conversations.len(),
        dialog.profiles.len(),
        dialog.account_deletions.len()
    );

    if save {
        if let Err(e) = dialog.save().await {
            warn!("Save failed: {}", e.alert_message());
            dialog.clear();
        }
    } else {
        dialog.clear();
    }

    match modal.result().await {
        Some(Dismissal::Saved(person)) => info!("Saved person id={:?}", person.id),
        Some(Dismissal::Cancel) => info!("Dialog dismissed without saving"),
        None => warn!("Dialog closed without a result"),
    }
    while let Ok(ev) = list_events.try_recv() {
        info!("Event {} ({})", ev.name(), ev.content);
    }

    popup.destroy();
    Ok(())
}
