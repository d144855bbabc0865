use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use listing_browser::sources::{HttpListingSource, InMemoryListingSource, ListingSource};
use listing_browser::{
    BrowserConfig, Completion, Direction, ListingBrowser, LoadDecision, ScrollSample,
    ScrollTrigger, VisibleMode,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Pages loaded by simulated scrolling before the demo stops
const MAX_SCROLL_PAGES: u32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Listing Browser");
    info!("==================");

    let config = BrowserConfig::from_env().context("Failed to load configuration")?;
    let source: Arc<dyn ListingSource> = if BrowserConfig::api_configured() {
        Arc::new(HttpListingSource::new(&config)?)
    } else {
        info!("LISTINGS_API_URL not set, using the seeded catalogue");
        Arc::new(InMemoryListingSource::seeded())
    };

    let initial_query = std::env::args().nth(1).unwrap_or_default();
    let mut trigger = ScrollTrigger::from_config(Direction::Next, &config);
    let interval = config.scroll_interval();
    let mut browser = ListingBrowser::new(source, config, &initial_query)?;

    match browser.load_neighborhoods().await {
        Ok(names) => info!("Neighborhoods: {}", names.join(", ")),
        Err(err) => warn!("{}", err),
    }

    info!("Route: {}", browser.route().href());
    let first = browser.start();
    report(browser.resolve(first).await);

    // Scroll down until the sentinel disappears
    let started = Instant::now();
    let mut scrolls = 0;
    while browser.has_more(Direction::Next) && scrolls < MAX_SCROLL_PAGES {
        scrolls += 1;
        let now = started + interval * scrolls;
        let sample = ScrollSample::new(Some(2_400.0), 1_000.0);
        let Some(signal) = trigger.on_scroll(sample, now) else {
            continue;
        };

        if let LoadDecision::Fetch(pending) = browser.on_load_signal(signal) {
            if let Some(next) = browser.next_page_route() {
                info!("Sentinel links to {}", next.href());
            }
            report(browser.resolve(pending).await);
        }
    }

    let listings = browser.visible_listings(VisibleMode::SinglePage);
    info!(
        "\n✅ Showing page {} of {} ({} listings)\n",
        browser.cache().current_page().unwrap_or(0),
        browser.cache().total_pages(),
        listings.len()
    );

    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({} R$)", i + 1, listing.address.street, listing.price);
        println!("   {} quartos, {} m²", listing.rooms, listing.area);
        println!("   Bairro: {}", listing.address.neighborhood);
        println!("   ID: {}", listing.id);
        println!();
    }

    let markers = serde_json::to_string_pretty(&browser.map_markers())?;
    println!("{}", markers);

    Ok(())
}

fn report(completion: Completion) {
    match completion {
        Completion::Applied { page, listings } => info!("Loaded page {} ({} listings)", page, listings),
        Completion::Empty => info!("Não há listagens para sua busca"),
        Completion::Stale => info!("Dropped a superseded response"),
        Completion::Failed(err) => warn!("{}", err),
    }
}
